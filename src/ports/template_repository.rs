//! Question template repository port.

use async_trait::async_trait;

use crate::domain::cycle::QuestionTemplate;
use crate::domain::foundation::{DomainError, TemplateId};

/// Repository port for question templates.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Store a template with its questions in order.
    async fn save(&self, template: &QuestionTemplate) -> Result<(), DomainError>;

    /// Find a template by ID, questions ordered by position.
    async fn find_by_id(&self, id: &TemplateId) -> Result<Option<QuestionTemplate>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn TemplateRepository) {}
    }
}
