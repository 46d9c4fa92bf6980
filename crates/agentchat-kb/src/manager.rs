use agentchat_api::{ApiClient, UploadFile};
use agentchat_types::{KbFile, KnowledgeBase};

use crate::duplicates::{parse_tags, DuplicateReport};
use crate::KbError;

/// Knowledge bases of one agent, with an optional selected base whose files
/// are loaded
pub struct KbManager {
    api: ApiClient,
    agent_name: String,
    knowledge_bases: Vec<KnowledgeBase>,
    selected: Option<String>,
}

impl KbManager {
    pub fn new(api: ApiClient, agent_name: impl Into<String>) -> Self {
        Self {
            api,
            agent_name: agent_name.into(),
            knowledge_bases: Vec::new(),
            selected: None,
        }
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn knowledge_bases(&self) -> &[KnowledgeBase] {
        &self.knowledge_bases
    }

    /// Re-fetch the list of knowledge bases, keeping loaded files of the
    /// selected base
    pub async fn load(&mut self) -> Result<&[KnowledgeBase], KbError> {
        let mut fetched = self.api.list_knowledge_bases(&self.agent_name).await?;

        if let Some(selected) = self.selected() {
            let files = selected.files.clone();
            if let Some(kb) = fetched.iter_mut().find(|kb| kb.id == selected.id) {
                kb.files = files;
            }
        }

        log::debug!(
            "Loaded {} knowledge bases for {}",
            fetched.len(),
            self.agent_name
        );
        self.knowledge_bases = fetched;
        Ok(&self.knowledge_bases)
    }

    pub fn selected(&self) -> Option<&KnowledgeBase> {
        let id = self.selected.as_deref()?;
        self.knowledge_bases.iter().find(|kb| kb.id == id)
    }

    /// Select a knowledge base and load its files
    pub async fn select(&mut self, kb_id: &str) -> Result<&KnowledgeBase, KbError> {
        if !self.knowledge_bases.iter().any(|kb| kb.id == kb_id) {
            return Err(KbError::UnknownKnowledgeBase(kb_id.to_string()));
        }
        self.selected = Some(kb_id.to_string());
        self.load_files().await?;
        self.selected().ok_or(KbError::NoSelection)
    }

    /// Re-fetch the files of the selected knowledge base
    pub async fn load_files(&mut self) -> Result<&[KbFile], KbError> {
        let id = self.selected.clone().ok_or(KbError::NoSelection)?;
        let files = self.api.list_kb_files(&id).await?;

        let kb = self
            .knowledge_bases
            .iter_mut()
            .find(|kb| kb.id == id)
            .ok_or_else(|| KbError::UnknownKnowledgeBase(id.clone()))?;
        Ok(kb.files.insert(files).as_slice())
    }

    /// Files of the selected knowledge base as last loaded
    pub fn selected_files(&self) -> &[KbFile] {
        self.selected()
            .and_then(|kb| kb.files.as_deref())
            .unwrap_or_default()
    }

    pub async fn create(&mut self, name: &str, description: &str) -> Result<(), KbError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(KbError::EmptyName);
        }

        self.api
            .create_knowledge_base(&self.agent_name, name, description.trim())
            .await?;
        log::info!("Created knowledge base '{}'", name);

        self.load().await?;
        Ok(())
    }

    /// Duplicate check of `files` against the selected knowledge base
    pub fn check_duplicates(&self, files: &[UploadFile]) -> DuplicateReport {
        DuplicateReport::build(files, self.selected_files())
    }

    /// Upload `files` to the selected knowledge base one at a time.
    ///
    /// Stops at the first failure; files before it stay uploaded. Lists are
    /// re-fetched after a fully successful batch.
    pub async fn upload(&mut self, files: &[UploadFile], tags_input: &str) -> Result<usize, KbError> {
        let kb_id = self
            .selected()
            .map(|kb| kb.id.clone())
            .ok_or(KbError::NoSelection)?;
        if files.is_empty() {
            return Err(KbError::NoFiles);
        }

        let tags = parse_tags(tags_input);
        for file in files {
            log::debug!("Uploading {} ({} bytes) to {}", file.name, file.size(), kb_id);
            self.api
                .upload_kb_file(&kb_id, file, &tags)
                .await
                .map_err(|source| KbError::Upload {
                    file: file.name.clone(),
                    source,
                })?;
        }

        self.load_files().await?;
        self.load().await?;
        Ok(files.len())
    }

    pub async fn delete_file(&mut self, file_id: &str) -> Result<(), KbError> {
        let kb_id = self
            .selected()
            .map(|kb| kb.id.clone())
            .ok_or(KbError::NoSelection)?;

        self.api.delete_kb_file(&kb_id, file_id).await?;
        log::info!("Deleted file {} from {}", file_id, kb_id);

        self.load_files().await?;
        self.load().await?;
        Ok(())
    }
}
