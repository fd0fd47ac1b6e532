//! Cloud file-storage actions.

use std::sync::Arc;

use crate::registry::ToolRegistry;
use crate::tools::composio::{ComposioAction, ComposioClient};

/// File-storage actions used to archive generated videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveAction {
    /// Find a folder by exact name.
    FindFolder,
    /// Upload a local file, optionally into a folder.
    UploadFile,
}

impl DriveAction {
    /// Every action, in registration order.
    pub const ALL: [DriveAction; 2] = [DriveAction::FindFolder, DriveAction::UploadFile];

    /// Registry name used for dispatch.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FindFolder => "drive_find_folder",
            Self::UploadFile => "drive_upload_file",
        }
    }

    /// Composio action slug.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::FindFolder => "GOOGLEDRIVE_FIND_FOLDER",
            Self::UploadFile => "GOOGLEDRIVE_UPLOAD_FILE",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::FindFolder => "Find a storage folder by exact name",
            Self::UploadFile => "Upload a local file to storage",
        }
    }

    /// Build the registry tool for this action.
    pub fn tool(&self, client: Arc<ComposioClient>) -> ComposioAction {
        ComposioAction::new(self.name(), self.slug(), self.description(), client)
    }
}

/// Register the file-storage actions on `registry`.
pub fn register_drive_actions(registry: &mut ToolRegistry, client: Arc<ComposioClient>) {
    for action in DriveAction::ALL {
        registry.register(action.tool(client.clone()));
    }
}
