use crate::buffer::AnswerBuffer;
use crate::model::Quiz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Current,
    Answered,
    Unanswered,
}

/// Position within the fixed question list. Any question is reachable at any time.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: usize,
    len: usize,
}

impl Navigator {
    pub fn new(len: usize) -> Self {
        Self { current: 0, len }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.len {
            self.current = index;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.current + 1)
    }

    pub fn prev(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(idx) => self.go_to(idx),
            None => false,
        }
    }

    /// Moves by `delta`, clamped to the list.
    pub fn jump(&mut self, delta: isize) {
        if self.len == 0 {
            return;
        }
        let target = (self.current as isize + delta).clamp(0, self.len as isize - 1);
        self.current = target as usize;
    }

    pub fn first(&mut self) {
        self.current = 0;
    }

    pub fn last(&mut self) {
        self.current = self.len.saturating_sub(1);
    }

    pub fn indicator(&self, index: usize, quiz: &Quiz, buffer: &AnswerBuffer) -> Indicator {
        if index == self.current {
            return Indicator::Current;
        }
        match quiz.questions.get(index) {
            Some(q) if buffer.is_answered(q.id) => Indicator::Answered,
            _ => Indicator::Unanswered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_to_is_unconstrained() {
        let mut nav = Navigator::new(5);
        assert!(nav.go_to(1));
        assert!(nav.go_to(4));
        assert_eq!(nav.current(), 4);
        assert!(nav.go_to(0));
        assert!(!nav.go_to(5));
        assert_eq!(nav.current(), 0);
    }

    #[test]
    fn test_prev_next_stop_at_edges() {
        let mut nav = Navigator::new(2);
        assert!(!nav.prev());
        assert!(nav.next());
        assert!(!nav.next());
        assert_eq!(nav.current(), 1);
    }

    #[test]
    fn test_jump_clamps() {
        let mut nav = Navigator::new(12);
        nav.jump(5);
        assert_eq!(nav.current(), 5);
        nav.jump(50);
        assert_eq!(nav.current(), 11);
        nav.jump(-100);
        assert_eq!(nav.current(), 0);
    }
}
