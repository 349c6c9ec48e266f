//! Linear undo/redo over repository commands

use crate::facade::RepositoryFacade;
use std::sync::Arc;

/// What a command gets to act on.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub repository: Arc<RepositoryFacade>,
}

impl CommandContext {
    pub fn new(repository: Arc<RepositoryFacade>) -> Self {
        CommandContext { repository }
    }
}

/// A reversible mutation.
///
/// The manager runs `before`, then `execute`, then `after`. A `before` that
/// returns false aborts the command without touching history.
pub trait Command: Send {
    /// Short name used in logs.
    fn label(&self) -> String;

    fn before(&mut self, _ctx: &CommandContext) -> bool {
        true
    }

    fn execute(&mut self, ctx: &CommandContext);

    fn after(&mut self, _ctx: &CommandContext) {}

    fn undo(&mut self, ctx: &CommandContext);
}

pub struct CommandManager {
    context: CommandContext,
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
}

impl CommandManager {
    pub fn new(repository: Arc<RepositoryFacade>) -> Self {
        CommandManager {
            context: CommandContext::new(repository),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    fn run(&self, command: &mut dyn Command) -> bool {
        if !command.before(&self.context) {
            tracing::debug!("Command {} rejected", command.label());
            return false;
        }
        command.execute(&self.context);
        command.after(&self.context);
        true
    }

    /// Run a new command. Returns false if its precondition failed.
    ///
    /// Accepting a command discards everything that could have been redone.
    pub fn execute(&mut self, command: impl Command + 'static) -> bool {
        let mut command: Box<dyn Command> = Box::new(command);
        if !self.run(command.as_mut()) {
            return false;
        }

        tracing::debug!("Executed {}", command.label());
        self.undo_stack.push(command);
        self.redo_stack.clear();
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(mut command) = self.undo_stack.pop() else {
            return false;
        };

        command.undo(&self.context);
        tracing::debug!("Undid {}", command.label());
        self.redo_stack.push(command);
        true
    }

    /// Re-run the most recently undone command through its full lifecycle.
    pub fn redo(&mut self) -> bool {
        let Some(mut command) = self.redo_stack.pop() else {
            return false;
        };

        if !self.run(command.as_mut()) {
            tracing::warn!("Dropping {} from redo history", command.label());
            return false;
        }

        tracing::debug!("Redid {}", command.label());
        self.undo_stack.push(command);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}
