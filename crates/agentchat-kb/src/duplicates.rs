use agentchat_api::UploadFile;
use agentchat_types::KbFile;

use crate::display::format_bytes;

/// Why a candidate upload looks like a file already in the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateFlag {
    SameName,
    /// Different name, identical size
    SameSize,
}

impl DuplicateFlag {
    pub fn label(&self) -> &'static str {
        match self {
            DuplicateFlag::SameName => "⚠️ Same Name",
            DuplicateFlag::SameSize => "⚠️ Same Size",
        }
    }
}

/// Flag shown next to a selected file. A name match wins over a size match.
pub fn detect_duplicate(name: &str, size: u64, existing: &[KbFile]) -> Option<DuplicateFlag> {
    if existing.iter().any(|f| f.file_name == name) {
        Some(DuplicateFlag::SameName)
    } else if existing
        .iter()
        .any(|f| f.file_size == size && f.file_name != name)
    {
        Some(DuplicateFlag::SameSize)
    } else {
        None
    }
}

/// Duplicate summary checked before an upload batch.
///
/// Unlike [`detect_duplicate`], the two checks are independent here, so one
/// file can be counted in both lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    pub same_name: Vec<String>,
    /// Entries read `name (size)`
    pub same_size: Vec<String>,
}

impl DuplicateReport {
    pub fn build(candidates: &[UploadFile], existing: &[KbFile]) -> Self {
        let mut report = Self::default();
        for file in candidates {
            let size = file.size();
            if existing.iter().any(|f| f.file_name == file.name) {
                report.same_name.push(file.name.clone());
            }
            if existing
                .iter()
                .any(|f| f.file_size == size && f.file_name != file.name)
            {
                report
                    .same_size
                    .push(format!("{} ({})", file.name, format_bytes(size)));
            }
        }
        report
    }

    pub fn is_empty(&self) -> bool {
        self.same_name.is_empty() && self.same_size.is_empty()
    }

    /// Confirmation prompt text, `None` when nothing collides
    pub fn warning_message(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut msg = String::from("Warning: Duplicate files detected!\n\n");
        if !self.same_name.is_empty() {
            msg.push_str(&format!(
                "{} file(s) with same name already exist.\n",
                self.same_name.len()
            ));
        }
        if !self.same_size.is_empty() {
            msg.push_str(&format!(
                "{} file(s) with same size already exist.\n",
                self.same_size.len()
            ));
        }
        msg.push_str("\nDo you want to upload anyway?");
        Some(msg)
    }
}

/// Split a comma-separated tag string, dropping blanks
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
