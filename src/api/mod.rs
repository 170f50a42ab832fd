//! Portal REST client.
//!
//! `PortalApi` is the seam between the application and the backend: the TUI
//! and the subcommands only ever talk to a `dyn PortalApi`, the HTTP client is
//! one implementation of it.

mod http;
pub mod wire;

use crate::error::Result;
use crate::model::{
    AssessmentSummary, AttemptId, AttemptRecord, CourseId, Material, MaterialBinary, MaterialId,
    Profile, Quiz, QuizId, SubmitReceipt, SubmittedAnswer,
};

pub use self::http::HttpPortalApi;

pub trait PortalApi: Send + Sync {
    fn profile(&self) -> Result<Profile>;

    fn assessments(&self) -> Result<Vec<AssessmentSummary>>;

    fn quiz(&self, id: QuizId) -> Result<Quiz>;

    /// Opens a new attempt for `quiz` and returns its identifier.
    fn start_attempt(&self, quiz: QuizId) -> Result<AttemptId>;

    /// Closes `attempt` with the given answers. Unanswered questions are absent.
    fn submit_attempt(
        &self,
        attempt: &AttemptId,
        answers: &[SubmittedAnswer],
    ) -> Result<SubmitReceipt>;

    fn attempts(&self) -> Result<Vec<AttemptRecord>>;

    fn materials(&self, course: CourseId) -> Result<Vec<Material>>;

    fn material_binary(&self, id: MaterialId) -> Result<MaterialBinary>;
}
