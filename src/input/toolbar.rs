use crate::paint::{Tool, ToolParseError};

const DOWNLOAD_LABEL: &str = "DOWNLOAD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarCommand {
    Download,
    SelectTool(Tool),
}

/// Resolves a toolbar button id. Ids are matched case-insensitively against
/// the tool labels; anything that is neither a tool nor the download button
/// is an error.
pub fn resolve_toolbar_label(label: &str) -> Result<ToolbarCommand, ToolParseError> {
    let label = label.to_uppercase();
    if label == DOWNLOAD_LABEL {
        return Ok(ToolbarCommand::Download);
    }
    label.parse().map(ToolbarCommand::SelectTool)
}
