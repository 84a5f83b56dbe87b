use crate::infra::Position;

/// Lifecycle of one learner. Never goes back to `Training` once `Testing` begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhase {
    Idle,
    Training,
    Testing,
    Done,
}

/// Mutable per-agent bookkeeping, owned by exactly one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentState {
    pub id: usize,
    pub position: Position,
    pub steps_taken: usize,
    pub episode: usize,
    pub phase: AgentPhase,
}

impl AgentState {
    pub fn new(id: usize, start: Position) -> Self {
        Self {
            id,
            position: start,
            steps_taken: 0,
            episode: 0,
            phase: AgentPhase::Idle,
        }
    }

    pub fn reset(&mut self, start: Position) {
        self.position = start;
        self.steps_taken = 0;
    }

    /// Moves to the next phase. Returns false if the transition is not allowed.
    pub fn advance_to(&mut self, phase: AgentPhase) -> bool {
        let allowed = matches!(
            (self.phase, phase),
            (AgentPhase::Idle, AgentPhase::Training)
                | (AgentPhase::Training, AgentPhase::Testing)
                | (AgentPhase::Testing, AgentPhase::Done)
        );
        if allowed {
            self.phase = phase;
        }
        allowed
    }
}
