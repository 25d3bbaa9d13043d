use crate::game::GameState;

/// Universal interface for all move-selecting agents.
pub trait Agent {
    /// Select an action (0..64) for the side to move. `None` means the side
    /// has no legal move and must pass.
    fn select_action(&mut self, state: &GameState) -> Option<usize>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}
