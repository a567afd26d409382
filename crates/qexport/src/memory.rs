//! In-memory store backed by a JSON snapshot

use crate::error::{StoreError, StoreResult};
use crate::store::{ExportStore, InstanceRowStream, RowFilter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use parking_lot::RwLock;
use qexport_eval::{ConditionTargetProvider, ProviderError};
use qexport_model::{
    Answer, AnswerType, InstanceHead, InstanceRow, InstanceStatus, Questionnaire,
    QuestionnaireRef, RowAnswer, StructureRow, UserFile,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A stored answer of an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAnswer {
    pub answer_option_id: i64,
    #[serde(default = "first_version")]
    pub versioning: i64,
    /// File and Image answers store the id of the uploaded file
    pub value: String,
}

fn first_version() -> i64 {
    1
}

/// A stored questionnaire instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredInstance {
    pub id: i64,
    pub questionnaire_id: i64,
    pub questionnaire_version: i64,
    pub participant: String,
    #[serde(default)]
    pub is_test_participant: bool,
    pub cycle: i64,
    pub date_of_issue: DateTime<Utc>,
    #[serde(default)]
    pub answer_date: Option<DateTime<Utc>>,
    pub status: InstanceStatus,
    #[serde(default)]
    pub release_version: Option<i64>,
    #[serde(default)]
    pub answers: Vec<StoredAnswer>,
}

impl StoredInstance {
    pub fn questionnaire(&self) -> QuestionnaireRef {
        QuestionnaireRef::new(self.questionnaire_id, self.questionnaire_version)
    }

    fn head(&self) -> InstanceHead {
        InstanceHead {
            id: self.id,
            status: self.status,
            release_version: self.release_version,
        }
    }

    /// Latest answer per answer option, not newer than the released answer version
    fn current_answers(&self) -> Vec<&StoredAnswer> {
        let limit = self.head().answer_version();
        let mut latest: Vec<&StoredAnswer> = Vec::new();
        for answer in &self.answers {
            if limit.is_some_and(|limit| answer.versioning > limit) {
                continue;
            }
            match latest
                .iter_mut()
                .find(|current| current.answer_option_id == answer.answer_option_id)
            {
                Some(current) if current.versioning < answer.versioning => *current = answer,
                Some(_) => {}
                None => latest.push(answer),
            }
        }
        latest
    }
}

/// Everything a [`MemoryStore`] holds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub questionnaires: Vec<Questionnaire>,
    #[serde(default)]
    pub instances: Vec<StoredInstance>,
    #[serde(default)]
    pub files: Vec<UserFile>,
}

/// [`ExportStore`] over an in-memory snapshot
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<StoreData>>,
}

impl MemoryStore {
    pub fn new(data: StoreData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn add_questionnaire(&self, questionnaire: Questionnaire) {
        self.data.write().questionnaires.push(questionnaire);
    }

    pub fn add_instance(&self, instance: StoredInstance) {
        self.data.write().instances.push(instance);
    }

    pub fn add_file(&self, file: UserFile) {
        self.data.write().files.push(file);
    }

    /// A copy of one questionnaire version
    pub fn questionnaire(&self, questionnaire: QuestionnaireRef) -> Option<Questionnaire> {
        self.data
            .read()
            .questionnaires
            .iter()
            .find(|candidate| candidate.reference() == questionnaire)
            .cloned()
    }

    fn instance_row(
        instance: &StoredInstance,
        answer_types: &HashMap<i64, AnswerType>,
        file_names: &HashMap<i64, Option<String>>,
    ) -> InstanceRow {
        let answers = instance
            .current_answers()
            .into_iter()
            .map(|answer| {
                let mut row_answer = RowAnswer::new(answer.answer_option_id, answer.value.clone());
                if matches!(
                    answer_types.get(&answer.answer_option_id),
                    Some(AnswerType::File | AnswerType::Image)
                ) {
                    row_answer.file_id = answer.value.trim().parse().ok();
                    row_answer.file_name = row_answer
                        .file_id
                        .and_then(|id| file_names.get(&id).cloned().flatten());
                }
                row_answer
            })
            .collect();

        InstanceRow {
            instance_id: instance.id,
            participant: instance.participant.clone(),
            is_test_participant: instance.is_test_participant,
            cycle: instance.cycle,
            date_of_issue: instance.date_of_issue,
            answer_date: instance.answer_date,
            status: instance.status,
            answers,
        }
    }
}

#[async_trait]
impl ExportStore for MemoryStore {
    async fn questionnaire_refs(&self, study: &str) -> StoreResult<Vec<QuestionnaireRef>> {
        let data = self.data.read();
        let mut refs: Vec<_> = data
            .questionnaires
            .iter()
            .filter(|questionnaire| questionnaire.study_id == study)
            .map(Questionnaire::reference)
            .collect();
        refs.sort();
        Ok(refs)
    }

    async fn structure(&self, questionnaire: QuestionnaireRef) -> StoreResult<Vec<StructureRow>> {
        self.questionnaire(questionnaire)
            .map(|found| StructureRow::flatten(&found))
            .ok_or(StoreError::QuestionnaireNotFound {
                id: questionnaire.id,
                version: questionnaire.version,
            })
    }

    async fn instance_rows(
        &self,
        questionnaire: QuestionnaireRef,
        filter: &RowFilter,
    ) -> StoreResult<InstanceRowStream> {
        let data = self.data.read();
        let structure = data
            .questionnaires
            .iter()
            .find(|candidate| candidate.reference() == questionnaire)
            .ok_or(StoreError::QuestionnaireNotFound {
                id: questionnaire.id,
                version: questionnaire.version,
            })?;

        let answer_types: HashMap<i64, AnswerType> = structure
            .questions
            .iter()
            .flat_map(|question| &question.answer_options)
            .map(|option| (option.id, option.answer_type))
            .collect();
        let file_names: HashMap<i64, Option<String>> = data
            .files
            .iter()
            .map(|file| (file.id, file.file_name.clone()))
            .collect();

        let mut positions: Vec<usize> = data
            .instances
            .iter()
            .enumerate()
            .filter(|(_, instance)| {
                instance.questionnaire() == questionnaire
                    && filter.matches(&instance.participant, instance.status, instance.date_of_issue)
            })
            .map(|(position, _)| position)
            .collect();
        positions.sort_by(|&a, &b| {
            let (a, b) = (&data.instances[a], &data.instances[b]);
            (&a.participant, a.cycle).cmp(&(&b.participant, b.cycle))
        });
        drop(data);

        // rows are built one at a time as the stream is pulled
        let data = Arc::clone(&self.data);
        let rows = stream::iter(positions).map(move |position| {
            data.read()
                .instances
                .get(position)
                .map(|instance| Self::instance_row(instance, &answer_types, &file_names))
                .ok_or_else(|| StoreError::query_failed(format!("instance at {position} removed")))
        });
        Ok(Box::pin(rows))
    }

    async fn user_files(&self, ids: &[i64]) -> StoreResult<Vec<UserFile>> {
        let data = self.data.read();
        Ok(data
            .files
            .iter()
            .filter(|file| ids.contains(&file.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ConditionTargetProvider for MemoryStore {
    async fn latest_released_instance(
        &self,
        participant: &str,
        questionnaire_id: i64,
        questionnaire_version: i64,
    ) -> Result<Option<InstanceHead>, ProviderError> {
        let target = QuestionnaireRef::new(questionnaire_id, questionnaire_version);
        Ok(self
            .data
            .read()
            .instances
            .iter()
            .filter(|instance| {
                instance.participant == participant
                    && instance.questionnaire() == target
                    && instance.status.is_released()
            })
            .max_by_key(|instance| instance.cycle)
            .map(StoredInstance::head))
    }

    async fn answer_option_type(
        &self,
        answer_option_id: i64,
    ) -> Result<Option<AnswerType>, ProviderError> {
        Ok(self
            .data
            .read()
            .questionnaires
            .iter()
            .flat_map(|questionnaire| &questionnaire.questions)
            .flat_map(|question| &question.answer_options)
            .find(|option| option.id == answer_option_id)
            .map(|option| option.answer_type))
    }

    async fn answer(
        &self,
        instance_id: i64,
        answer_option_id: i64,
        versioning: i64,
    ) -> Result<Option<Answer>, ProviderError> {
        let data = self.data.read();
        let Some(instance) = data.instances.iter().find(|instance| instance.id == instance_id) else {
            return Ok(None);
        };
        Ok(instance
            .answers
            .iter()
            .find(|answer| answer.answer_option_id == answer_option_id && answer.versioning == versioning)
            .map(|answer| Answer {
                instance_id,
                answer_option_id,
                versioning,
                value: answer.value.clone(),
            }))
    }
}
