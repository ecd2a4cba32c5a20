// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fmt::{self, Display};

/// The word fixture used by the sequence scenarios.
pub const WORDS: [&str; 7] = ["asd", "sdf", "dfg", "fgh", "ghj", "hjk", "jl"];

/// The letter fixture used by the recovery scenarios.
pub const LETTERS: [&str; 5] = ["a", "b", "c", "d", "e"];

pub fn words() -> Vec<String> {
    WORDS.iter().map(|w| (*w).to_string()).collect()
}

pub fn letters() -> Vec<String> {
    LETTERS.iter().map(|l| (*l).to_string()).collect()
}

/// `1..=n` as `i64`, matching what `Flux::range(1, n)` emits.
pub fn one_to(n: i64) -> Vec<i64> {
    (1..=n).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Person {
    pub name: String,
    pub age: u32,
}

impl Person {
    #[must_use]
    pub const fn new(name: String, age: u32) -> Self {
        Self { name, age }
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Person[name={}, age={}]", self.name, self.age)
    }
}

pub fn person_alice() -> Person {
    Person::new("Alice".to_string(), 25)
}

pub fn person_bob() -> Person {
    Person::new("Bob".to_string(), 30)
}

pub fn person_charlie() -> Person {
    Person::new("Charlie".to_string(), 35)
}

pub fn people() -> Vec<Person> {
    vec![person_alice(), person_bob(), person_charlie()]
}
