//! Migration orchestrator - drives one content item from the source appliance to the destination

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::migration::progress::{LoggingEventHandler, MigrationEvent, MigrationEventHandler};
use crate::migration::steps::{
    authenticate, build_export_package, export_package, import_package, resolve_content,
};
use crate::migration::types::{MigrationReport, MigrationRequest, MigrationState};
use crate::migration::workspace::WorkingDirectory;
use crate::services::client::VraApi;
use crate::services::config::MigrationConfig;
use crate::services::errors::{MigrationError, MigrationResult};
use crate::utils::run_id;

/// Runs the migration pipeline against a `VraApi` implementation.
///
/// An orchestrator is good for repeated runs; each `run` starts again from `Start`.
pub struct MigrationOrchestrator {
    api: Arc<dyn VraApi>,
    config: MigrationConfig,
    events: Box<dyn MigrationEventHandler>,
    state: MigrationState,
    failed_stage: Option<MigrationState>,
}

impl MigrationOrchestrator {
    pub fn new(api: Arc<dyn VraApi>, config: MigrationConfig) -> Self {
        Self {
            api,
            config,
            events: Box::new(LoggingEventHandler),
            state: MigrationState::Start,
            failed_stage: None,
        }
    }

    pub fn with_event_handler<H: MigrationEventHandler + 'static>(mut self, handler: H) -> Self {
        self.events = Box::new(handler);
        self
    }

    pub fn state(&self) -> MigrationState {
        self.state
    }

    /// Stage that was active when the last run failed
    pub fn failed_stage(&self) -> Option<MigrationState> {
        self.failed_stage
    }

    /// Migrate `request.content_name` from the source host to the destination host
    pub async fn run(&mut self, request: &MigrationRequest) -> MigrationResult<MigrationReport> {
        self.state = MigrationState::Start;
        self.failed_stage = None;

        let started = Instant::now();
        info!(
            "[Migration] Migrating '{}' from {} to {}",
            request.content_name, request.source_host, request.destination_host
        );
        self.events.handle_event(MigrationEvent::Started {
            content_name: request.content_name.clone(),
        });

        let result = match self.preflight(request) {
            Ok(()) => self.execute(request, started).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(report) => {
                self.advance(MigrationState::Done);
                info!(
                    "[Migration] '{}' migrated as package {} in {:?}",
                    report.content.name, report.package.name, report.duration
                );
                self.events.handle_event(MigrationEvent::Completed { success: true });
            }
            Err(e) => {
                let step = self.state;
                error!("[Migration] Failed during {}: {}", step, e);
                self.events.handle_event(MigrationEvent::Error {
                    step,
                    message: e.to_string(),
                });
                self.failed_stage = Some(step);
                self.state = MigrationState::Failed;
                self.events.handle_event(MigrationEvent::Completed { success: false });
            }
        }

        result
    }

    fn preflight(&self, request: &MigrationRequest) -> MigrationResult<()> {
        request
            .validate()
            .and_then(|()| self.config.validate())
            .map_err(|message| MigrationError::Configuration { message })
    }

    fn advance(&mut self, next: MigrationState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }

    fn begin(&mut self, step: MigrationState) -> Instant {
        self.advance(step);
        self.events.handle_event(MigrationEvent::StepBegun { step });
        Instant::now()
    }

    fn complete(&self, step: MigrationState, started: Instant) {
        self.events.handle_event(MigrationEvent::StepCompleted {
            step,
            duration_ms: started.elapsed().as_millis() as u64,
        });
    }

    async fn execute(
        &mut self,
        request: &MigrationRequest,
        started: Instant,
    ) -> MigrationResult<MigrationReport> {
        let api = Arc::clone(&self.api);
        let api = api.as_ref();
        let config = self.config.clone();

        let step = self.begin(MigrationState::AuthSource);
        let source = authenticate(
            api,
            &request.source_credential(),
            &config,
            MigrationState::AuthSource,
        )
        .await?;
        self.complete(MigrationState::AuthSource, step);

        let step = self.begin(MigrationState::AuthDestination);
        let destination = authenticate(
            api,
            &request.destination_credential(),
            &config,
            MigrationState::AuthDestination,
        )
        .await?;
        self.complete(MigrationState::AuthDestination, step);

        let step = self.begin(MigrationState::ResolveContent);
        let content = resolve_content(api, &source, &request.content_name, &config).await?;
        self.complete(MigrationState::ResolveContent, step);

        let step = self.begin(MigrationState::BuildPackage);
        let package = build_export_package(api, &source, &content, &config).await?;
        self.complete(MigrationState::BuildPackage, step);

        let step = self.begin(MigrationState::Export);
        let workdir = WorkingDirectory::create(&config.base_dir, &run_id())?;
        let exported = match export_package(api, &source, &package, &workdir, &config).await {
            Ok(exported) => exported,
            Err(e) => {
                self.keep_for_inspection(&workdir);
                return Err(e);
            }
        };
        self.complete(MigrationState::Export, step);

        let step = self.begin(MigrationState::Import);
        if let Err(e) = import_package(api, &destination, &exported.path, &config).await {
            self.keep_for_inspection(&workdir);
            return Err(e);
        }
        // Content is already on the destination at this point
        if let Err(e) = workdir.remove() {
            let message = format!("Migration succeeded but cleanup failed: {}", e);
            warn!("[Migration] {}", message);
            self.events.handle_event(MigrationEvent::Warning { message });
        }
        self.complete(MigrationState::Import, step);

        Ok(MigrationReport {
            source_host: request.source_host.clone(),
            destination_host: request.destination_host.clone(),
            content,
            package,
            archive_bytes: exported.size_bytes,
            archive_files: exported.file_count,
            duration: started.elapsed(),
        })
    }

    fn keep_for_inspection(&self, workdir: &WorkingDirectory) {
        let message = format!("Working directory kept at {}", workdir.path().display());
        warn!("[Migration] {}", message);
        self.events.handle_event(MigrationEvent::Warning { message });
    }
}
