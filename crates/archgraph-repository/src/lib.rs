//! Observable repository and undoable commands over the architecture graph

pub mod command;
pub mod commands;
pub mod facade;


pub use command::{Command, CommandContext, CommandManager};
pub use commands::{
    AddDependencyCommand, CreateNodeCommand, RemoveNodeCommand, RenameNodeCommand,
    SelectEntityCommand, ToggleSelectionCommand,
};
pub use facade::{FlowsSnapshot, RepositoryFacade, SelectionSnapshot, StoreSnapshot};
