//! Built-in commands

use crate::command::{Command, CommandContext};
use archgraph_core::{ArchNode, Dependency, SelectableEntity, Selection};

/// Adds a node. Refused when the id is already taken.
pub struct CreateNodeCommand {
    node: ArchNode,
}

impl CreateNodeCommand {
    pub fn new(node: ArchNode) -> Self {
        CreateNodeCommand { node }
    }
}

impl Command for CreateNodeCommand {
    fn label(&self) -> String {
        format!("create {}", self.node.id)
    }

    fn before(&mut self, ctx: &CommandContext) -> bool {
        !ctx.repository.store().contains(&self.node.id)
    }

    fn execute(&mut self, ctx: &CommandContext) {
        ctx.repository.add_node(self.node.clone());
    }

    fn undo(&mut self, ctx: &CommandContext) {
        ctx.repository.remove_node(&self.node.id);
    }
}

pub struct RemoveNodeCommand {
    id: String,
    removed: Option<ArchNode>,
}

impl RemoveNodeCommand {
    pub fn new(id: impl Into<String>) -> Self {
        RemoveNodeCommand {
            id: id.into(),
            removed: None,
        }
    }
}

impl Command for RemoveNodeCommand {
    fn label(&self) -> String {
        format!("remove {}", self.id)
    }

    fn before(&mut self, ctx: &CommandContext) -> bool {
        self.removed = ctx.repository.node(&self.id);
        self.removed.is_some()
    }

    fn execute(&mut self, ctx: &CommandContext) {
        ctx.repository.remove_node(&self.id);
    }

    fn undo(&mut self, ctx: &CommandContext) {
        if let Some(node) = self.removed.clone() {
            ctx.repository.add_node(node);
        }
    }
}

pub struct RenameNodeCommand {
    id: String,
    name: String,
    previous: Option<String>,
}

impl RenameNodeCommand {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        RenameNodeCommand {
            id: id.into(),
            name: name.into(),
            previous: None,
        }
    }
}

impl Command for RenameNodeCommand {
    fn label(&self) -> String {
        format!("rename {} to {}", self.id, self.name)
    }

    fn before(&mut self, ctx: &CommandContext) -> bool {
        self.previous = ctx.repository.node(&self.id).map(|n| n.name);
        self.previous.is_some()
    }

    fn execute(&mut self, ctx: &CommandContext) {
        ctx.repository.rename_node(&self.id, self.name.clone());
    }

    fn undo(&mut self, ctx: &CommandContext) {
        if let Some(previous) = self.previous.clone() {
            ctx.repository.rename_node(&self.id, previous);
        }
    }
}

pub struct AddDependencyCommand {
    source_id: String,
    dependency: Dependency,
    previous: Vec<Dependency>,
}

impl AddDependencyCommand {
    pub fn new(source_id: impl Into<String>, dependency: Dependency) -> Self {
        AddDependencyCommand {
            source_id: source_id.into(),
            dependency,
            previous: Vec::new(),
        }
    }
}

impl Command for AddDependencyCommand {
    fn label(&self) -> String {
        format!("link {} -> {}", self.source_id, self.dependency.target_id)
    }

    fn before(&mut self, ctx: &CommandContext) -> bool {
        match ctx.repository.node(&self.source_id) {
            Some(node) => {
                self.previous = node.dependencies;
                true
            }
            None => false,
        }
    }

    fn execute(&mut self, ctx: &CommandContext) {
        ctx.repository
            .add_dependency(&self.source_id, self.dependency.clone());
    }

    fn undo(&mut self, ctx: &CommandContext) {
        let previous = self.previous.clone();
        ctx.repository.update_node(&self.source_id, |mut node| {
            node.dependencies = previous;
            node
        });
    }
}

/// Replaces the selection with a single entity.
pub struct SelectEntityCommand {
    entity: SelectableEntity,
    previous: Selection,
}

impl SelectEntityCommand {
    pub fn new(entity: SelectableEntity) -> Self {
        SelectEntityCommand {
            entity,
            previous: Selection::new(),
        }
    }
}

impl Command for SelectEntityCommand {
    fn label(&self) -> String {
        format!("select {:?}", self.entity)
    }

    fn execute(&mut self, ctx: &CommandContext) {
        self.previous = Selection::clone(&ctx.repository.selection());
        ctx.repository
            .set_selection(Selection::from([self.entity.clone()]));
    }

    fn undo(&mut self, ctx: &CommandContext) {
        ctx.repository.set_selection(self.previous.clone());
    }
}

pub struct ToggleSelectionCommand {
    entity: SelectableEntity,
}

impl ToggleSelectionCommand {
    pub fn new(entity: SelectableEntity) -> Self {
        ToggleSelectionCommand { entity }
    }
}

impl Command for ToggleSelectionCommand {
    fn label(&self) -> String {
        format!("toggle {:?}", self.entity)
    }

    fn execute(&mut self, ctx: &CommandContext) {
        ctx.repository.toggle_selection(self.entity.clone());
    }

    fn undo(&mut self, ctx: &CommandContext) {
        ctx.repository.toggle_selection(self.entity.clone());
    }
}
