//! Session view controller.
//!
//! Owns the session, the polling task of the in-flight job and the
//! playhead. Poll events are applied from the owner's side, so the model
//! is only ever written here; layout and playhead read snapshots of it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use shotscope_client::{spawn_poller, ClientError, JobApi, PollConfig, PollEvent, PollTask};
use shotscope_models::{
    AnalysisResult, DeleteJobResponse, HistoryItem, JobHandle, JobRequest, JobSnapshot, JobStatus,
};
use shotscope_timeline::{
    build_model, merge_model, ElementRef, FeatureDetail, PlayheadSynchronizer, TimelineLayout,
    TrackGeometry,
};

use crate::config::EngineConfig;
use crate::error::{SessionError, SessionResult};
use crate::export::ExportDocument;
use crate::session::Session;
use crate::state::{AppArea, ViewState};

/// Drives one analysis session at a time.
pub struct SessionController<A: JobApi + ?Sized + 'static> {
    api: Arc<A>,
    poll_config: PollConfig,
    session: Session,
    area: AppArea,
    poll_task: Option<PollTask>,
    playhead: PlayheadSynchronizer,
}

impl<A: JobApi + ?Sized + 'static> SessionController<A> {
    pub fn new(api: Arc<A>, poll_config: PollConfig, geometry: TrackGeometry) -> Self {
        Self {
            api,
            poll_config,
            session: Session::new(),
            area: AppArea::ShotAnalysis,
            poll_task: None,
            playhead: PlayheadSynchronizer::new(geometry),
        }
    }

    pub fn from_config(api: Arc<A>, config: &EngineConfig) -> Self {
        Self::new(api, config.poll.clone(), config.geometry)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view_state(&self) -> &ViewState {
        &self.session.view
    }

    pub fn area(&self) -> AppArea {
        self.area
    }

    pub fn last_error(&self) -> Option<&str> {
        self.session.last_error.as_deref()
    }

    /// True while a polling loop is attached to the session.
    pub fn is_job_in_flight(&self) -> bool {
        self.poll_task.is_some()
    }

    pub fn playhead(&self) -> &PlayheadSynchronizer {
        &self.playhead
    }

    pub fn playhead_mut(&mut self) -> &mut PlayheadSynchronizer {
        &mut self.playhead
    }

    /// Layout of the current model, if there is one.
    pub fn layout(&self) -> Option<TimelineLayout> {
        self.session.model.as_ref().map(TimelineLayout::compute)
    }

    /// Detail panel content for a selected feature element.
    pub fn feature_detail(&self, element: &ElementRef) -> Option<FeatureDetail> {
        FeatureDetail::for_element(self.session.model.as_ref()?, element)
    }

    /// Submit a new job and start polling it.
    ///
    /// Rejected while another job is in flight. Validation and submission
    /// failures leave the view idle with the message recorded.
    pub async fn submit(&mut self, request: JobRequest) -> SessionResult<JobHandle> {
        if let Some(job_id) = self.in_flight_job_id() {
            warn!(job_id = %job_id, "Rejecting submission while a job is in flight");
            return Err(SessionError::JobInFlight(job_id));
        }

        let submitted = match request.validate() {
            Ok(()) => self.api.submit(&request).await,
            Err(e) => Err(ClientError::from(e)),
        };
        let handle = match submitted {
            Ok(handle) => handle,
            Err(e) => {
                self.session.view = ViewState::Idle;
                self.session.last_error = Some(e.user_message());
                return Err(e.into());
            }
        };

        info!(
            job_id = %handle.id,
            mode = %request.mode.as_str(),
            "Analysis session started"
        );

        let task = spawn_poller(Arc::clone(&self.api), handle.id.clone(), self.poll_config.clone());
        self.session = Session::fresh(request, handle.clone());
        self.poll_task = Some(task);
        self.playhead.clear();

        Ok(handle)
    }

    /// Apply every event the polling task has produced so far.
    ///
    /// Returns the number of events applied.
    pub fn pump(&mut self) -> usize {
        let mut events = Vec::new();
        if let Some(task) = self.poll_task.as_mut() {
            while let Some(event) = task.try_next_event() {
                events.push(event);
            }
        }

        let applied = events.len();
        for event in events {
            self.apply_event(event);
        }
        applied
    }

    /// Wait for the next event and apply it.
    ///
    /// Returns `false` once no job is in flight.
    pub async fn next_event(&mut self) -> bool {
        let Some(task) = self.poll_task.as_mut() else {
            return false;
        };

        match task.next_event().await {
            Some(event) => {
                self.apply_event(event);
                true
            }
            None => {
                self.poll_task = None;
                false
            }
        }
    }

    /// Apply events until the job finishes one way or the other.
    pub async fn run_to_completion(&mut self) -> &ViewState {
        while self.next_event().await {}
        &self.session.view
    }

    /// Apply one polling event to the session.
    pub fn apply_event(&mut self, event: PollEvent) {
        match event {
            PollEvent::Snapshot(snapshot) => self.apply_snapshot(&snapshot),
            PollEvent::Completed(result) => self.apply_final(result),
            PollEvent::Failed(error) => self.apply_failure(error),
        }
    }

    fn apply_snapshot(&mut self, snapshot: &JobSnapshot) {
        if let Some(job) = self.session.job.as_mut() {
            if !job.advance(snapshot) {
                warn!(
                    job_id = %job.id,
                    from = %job.status,
                    to = %snapshot.status,
                    "Ignoring backward job status transition"
                );
            }
        }

        match snapshot.partial_result() {
            Some(partial) => {
                let model = match self.session.model.as_ref() {
                    Some(previous) if !previous.streaming => return,
                    Some(previous) => merge_model(previous, partial),
                    None => build_model(partial, true),
                };
                debug!(
                    job_id = %snapshot.job_id,
                    segments = model.segment_count(),
                    streaming = model.streaming,
                    "Applied partial result"
                );
                self.session.model = Some(model);
                self.session.result = Some(partial.clone());
                self.session.view = ViewState::Timeline;
            }
            None => {
                if self.session.view.is_loading() {
                    self.session.view = ViewState::Loading {
                        progress: snapshot.progress.clone(),
                    };
                }
            }
        }
    }

    fn apply_final(&mut self, result: AnalysisResult) {
        if let Some(job) = self.session.job.as_mut() {
            job.status = JobStatus::Succeeded;
        }

        let model = build_model(&result, false);
        info!(
            job_id = ?self.session.job_id(),
            summary = %model.summary(),
            "Analysis complete"
        );

        self.session.model = Some(model);
        self.session.result = Some(result);
        self.session.last_error = None;
        self.session.view = ViewState::Timeline;
        self.poll_task = None;
    }

    fn apply_failure(&mut self, error: ClientError) {
        if let (Some(job), ClientError::Analysis(_)) = (self.session.job.as_mut(), &error) {
            job.status = JobStatus::Failed;
        }

        warn!(
            job_id = ?self.session.job_id(),
            error = %error,
            "Analysis session ended without a result"
        );

        self.session.model = None;
        self.session.result = None;
        self.session.last_error = Some(error.user_message());
        self.session.view = ViewState::Idle;
        self.poll_task = None;
    }

    /// Move to another application area. Polling continues in the
    /// background and events keep being applied to the session.
    pub fn switch_area(&mut self, area: AppArea) {
        debug!(from = %self.area.as_str(), to = %area.as_str(), "Switching area");
        self.area = area;
    }

    /// Come back to the analysis area and re-attach to the same session.
    pub fn return_to_analysis(&mut self) -> &ViewState {
        self.switch_area(AppArea::ShotAnalysis);
        if !self.session.has_job() {
            self.session.view = ViewState::Idle;
        }
        &self.session.view
    }

    /// Replace the session with a finished job from history.
    pub async fn load_history(&mut self, job_id: &str) -> SessionResult<&Session> {
        if let Some(active) = self.in_flight_job_id() {
            return Err(SessionError::JobInFlight(active));
        }

        let snapshot = self.api.poll(job_id).await?;
        let Some(result) = snapshot.result() else {
            return Err(SessionError::NotReplayable {
                job_id: job_id.to_string(),
                status: snapshot.status,
            });
        };

        let mut handle = JobHandle::new(snapshot.job_id.clone());
        handle.status = JobStatus::Succeeded;
        self.session = Session::replay(handle, result.clone());
        self.area = AppArea::ShotAnalysis;
        self.playhead.clear();

        info!(job_id = %job_id, "Loaded historical session");
        Ok(&self.session)
    }

    /// Start over: abandon any polling loop and clear the session.
    pub fn reset(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abandon();
        }
        self.session = Session::new();
        self.playhead.clear();
    }

    pub async fn history(&self, limit: u32) -> SessionResult<Vec<HistoryItem>> {
        Ok(self.api.history(limit).await?)
    }

    /// Delete a job; the session is reset if it shows that job and no
    /// polling is attached.
    pub async fn delete_job(&mut self, job_id: &str) -> SessionResult<DeleteJobResponse> {
        let ack = self.api.delete(job_id).await?;
        if ack.success && self.session.job_id() == Some(job_id) && !self.is_job_in_flight() {
            self.reset();
        }
        Ok(ack)
    }

    /// Export document for the current result.
    pub fn export(&self) -> SessionResult<ExportDocument> {
        ExportDocument::from_session(&self.session)
    }

    fn in_flight_job_id(&self) -> Option<String> {
        self.poll_task.as_ref().map(|t| t.job_id().to_string())
    }
}
