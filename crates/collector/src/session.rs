//! One conversation of the guided form.
//!
//! A [`Session`] walks the fixed order name → age → grade. Every accepted
//! answer fills exactly one field and moves the step forward; once the last
//! field is in, the session hands out the finished [`NewRecord`].

use crate::{error::SessionError, record::NewRecord};

/// Position in the form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Step {
    #[default]
    AwaitingName,
    AwaitingAge,
    AwaitingGrade,
    Complete,
}

impl Step {
    /// The step that follows this one. `Complete` is terminal.
    pub fn next(self) -> Step {
        match self {
            Step::AwaitingName => Step::AwaitingAge,
            Step::AwaitingAge => Step::AwaitingGrade,
            Step::AwaitingGrade | Step::Complete => Step::Complete,
        }
    }

    /// Question sent to the user when the step is entered.
    pub fn prompt(self) -> &'static str {
        match self {
            Step::AwaitingName => "Привет! Как тебя зовут?",
            Step::AwaitingAge => "Сколько тебе лет?",
            Step::AwaitingGrade => "В каком классе ты учишься?",
            Step::Complete => "Спасибо! Анкета заполнена.",
        }
    }

    fn field(self) -> Option<&'static str> {
        match self {
            Step::AwaitingName => Some("name"),
            Step::AwaitingAge => Some("age"),
            Step::AwaitingGrade => Some("grade"),
            Step::Complete => None,
        }
    }
}

/// Answers collected so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub name: Option<String>,
    pub age: Option<String>,
    pub grade: Option<String>,
}

impl Draft {
    fn slot_mut(&mut self, step: Step) -> Option<&mut Option<String>> {
        match step {
            Step::AwaitingName => Some(&mut self.name),
            Step::AwaitingAge => Some(&mut self.age),
            Step::AwaitingGrade => Some(&mut self.grade),
            Step::Complete => None,
        }
    }

    fn finish(&mut self) -> Option<NewRecord> {
        match (self.name.take(), self.age.take(), self.grade.take()) {
            (Some(name), Some(age), Some(grade)) => Some(NewRecord { name, age, grade }),
            (name, age, grade) => {
                // Put back whatever we had; the draft stays as it was.
                self.name = name;
                self.age = age;
                self.grade = grade;
                None
            }
        }
    }
}

/// Result of feeding one answer into a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The session moved to this step; its prompt must be sent.
    Prompt(Step),
    /// All fields are collected.
    Finished(NewRecord),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    step: Step,
    draft: Draft,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Store `text` verbatim in the field of the current step and advance.
    pub fn accept(&mut self, text: &str) -> Result<Transition, SessionError> {
        let step = self.step;
        let field = step.field().ok_or(SessionError::AlreadyComplete)?;
        let slot = self
            .draft
            .slot_mut(step)
            .ok_or(SessionError::AlreadyComplete)?;
        if slot.is_some() {
            return Err(SessionError::FieldAlreadySet(field));
        }
        *slot = Some(text.to_string());

        let next = step.next();
        if next != Step::Complete {
            self.step = next;
            return Ok(Transition::Prompt(next));
        }

        // Only reachable after the grade, so every field is present.
        let record = self.draft.finish().ok_or(SessionError::AlreadyComplete)?;
        self.step = Step::Complete;
        Ok(Transition::Finished(record))
    }
}
