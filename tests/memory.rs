use banter::{ConfigurationError, TurnMemory};

fn contents(memory: &TurnMemory) -> Vec<(String, String)> {
    memory
        .exchanges()
        .map(|e| (e.user().to_string(), e.bot().to_string()))
        .collect()
}

#[test]
fn size_never_exceeds_capacity() {
    for k in 1..=4 {
        let mut memory = TurnMemory::new(k).unwrap();
        for i in 0..10 {
            memory.record(format!("u{i}"), format!("b{i}"));
            assert!(memory.size() <= k as usize);
        }
    }
}

#[test]
fn keeps_last_k_in_order() {
    let k = 3;
    let n = 7;
    let mut memory = TurnMemory::new(k).unwrap();
    for i in 1..=n {
        memory.record(format!("u{i}"), format!("b{i}"));
    }
    let expected: Vec<_> = (n - k + 1..=n)
        .map(|i| (format!("u{i}"), format!("b{i}")))
        .collect();
    assert_eq!(contents(&memory), expected);
}

#[test]
fn prompt_always_ends_with_bot_cue() {
    let mut memory = TurnMemory::new(2).unwrap();
    for i in 0..4 {
        let prompt = memory.render_prompt(&format!("q{i}\n"));
        assert!(prompt.ends_with("\nBot:") || prompt == "Bot:");
        assert!(!prompt.ends_with('\n'));
        memory.record(format!("q{i}"), "a");
    }
}

#[test]
fn prompt_for_single_exchange() {
    let mut memory = TurnMemory::new(4).unwrap();
    assert_eq!(memory.render_prompt("hi"), "User: hi\nBot:");
    memory.record("a", "b");
    assert_eq!(memory.render_prompt("c"), "User: a\nBot: b\nUser: c\nBot:");
}

#[test]
fn construction_rejects_zero_and_negative() {
    assert!(matches!(
        TurnMemory::new(0),
        Err(ConfigurationError::InvalidMaxTurns { max_turns: 0 })
    ));
    assert!(matches!(
        TurnMemory::new(-1),
        Err(ConfigurationError::InvalidMaxTurns { max_turns: -1 })
    ));
    assert_eq!(TurnMemory::new(1).unwrap().max_turns(), 1);
}

#[test]
fn clear_always_yields_empty() {
    let mut memory = TurnMemory::new(3).unwrap();
    memory.clear();
    assert_eq!(memory.size(), 0);
    for i in 0..5 {
        memory.record(i.to_string(), "x");
    }
    memory.clear();
    assert_eq!(memory.size(), 0);
    assert_eq!(memory.render_prompt("z"), "User: z\nBot:");
}
