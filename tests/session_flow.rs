use anyhow::anyhow;
use job_doodle::draw::{DrawingSurface, Point};
use job_doodle::gateway::{AiGateway, DrawingRequest, JobRequest};
use job_doodle::session::{
    Job, Notice, Orchestrator, DRAW_FIRST_MESSAGE, GENERATION_ERROR_MESSAGE,
};
use job_doodle::status::{StatusDisplay, StatusView};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(5);

/// Gateway whose job call blocks until the test releases it.
struct GatedGateway {
    release: Mutex<Receiver<anyhow::Result<Job>>>,
    job_calls: AtomicUsize,
    drawing_calls: AtomicUsize,
    remark: String,
}

impl GatedGateway {
    fn new(remark: &str) -> (Arc<Self>, Sender<anyhow::Result<Job>>) {
        let (tx, rx) = channel();
        let gateway = Arc::new(Self {
            release: Mutex::new(rx),
            job_calls: AtomicUsize::new(0),
            drawing_calls: AtomicUsize::new(0),
            remark: remark.to_string(),
        });
        (gateway, tx)
    }
}

impl AiGateway for GatedGateway {
    fn generate_job(&self, _request: &JobRequest) -> anyhow::Result<Job> {
        self.job_calls.fetch_add(1, Ordering::SeqCst);
        self.release
            .lock()
            .unwrap()
            .recv()
            .unwrap_or_else(|_| Err(anyhow!("released without a reply")))
    }

    fn describe_drawing(&self, _request: &DrawingRequest) -> anyhow::Result<String> {
        self.drawing_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.remark.clone())
    }
}

fn sky_gardener() -> Job {
    Job {
        title: "Sky Gardener".into(),
        description: "Tends floating gardens.".into(),
    }
}

fn attached_surface() -> DrawingSurface {
    let mut surface = DrawingSurface::new();
    surface.resize((120.0, 90.0), 2.0);
    surface
}

#[test]
fn generated_job_is_shown_in_status_panel() {
    let (gateway, release) = GatedGateway::new("unused");
    let mut orchestrator = Orchestrator::new(gateway);
    let mut surface = attached_surface();
    let mut status = StatusDisplay::new();

    assert!(orchestrator.generate_job(&mut surface));
    release.send(Ok(sky_gardener())).unwrap();
    assert!(orchestrator.wait_for_reply(WAIT));

    let state = orchestrator.state();
    assert!(!state.loading);
    assert_eq!(state.error, None);
    let view = status.view(
        state.job.as_ref(),
        state.loading,
        state.generation_error(),
        Instant::now(),
    );
    assert_eq!(
        view,
        StatusView::Job {
            title: "Sky Gardener".into(),
            description: "Tends floating gardens.".into(),
        }
    );
}

#[test]
fn failed_generation_shows_fixed_error() {
    let (gateway, release) = GatedGateway::new("unused");
    let mut orchestrator = Orchestrator::new(gateway);
    let mut surface = attached_surface();
    let mut status = StatusDisplay::new();

    orchestrator.generate_job(&mut surface);
    release.send(Err(anyhow!("connection reset"))).unwrap();
    assert!(orchestrator.wait_for_reply(WAIT));

    let state = orchestrator.state();
    assert_eq!(state.job, None);
    let view = status.view(
        state.job.as_ref(),
        state.loading,
        state.generation_error(),
        Instant::now(),
    );
    assert_eq!(
        view,
        StatusView::Error {
            message: GENERATION_ERROR_MESSAGE.into()
        }
    );
}

#[test]
fn second_generate_while_pending_is_dropped() {
    let (gateway, release) = GatedGateway::new("unused");
    let mut orchestrator = Orchestrator::new(Arc::clone(&gateway) as Arc<dyn AiGateway>);
    let mut surface = attached_surface();

    assert!(orchestrator.generate_job(&mut surface));
    let pending = orchestrator.state().clone();
    surface.start_stroke(Point::new(10.0, 10.0));
    surface.end_stroke();

    assert!(!orchestrator.generate_job(&mut surface));
    assert_eq!(orchestrator.state(), &pending);
    // The dropped call must not have cleared the canvas either.
    assert!(surface.has_ink());

    release.send(Ok(sky_gardener())).unwrap();
    assert!(orchestrator.wait_for_reply(WAIT));
    assert_eq!(gateway.job_calls.load(Ordering::SeqCst), 1);
    assert!(!orchestrator.wait_for_reply(Duration::from_millis(50)));
}

#[test]
fn check_is_ignored_while_generating() {
    let (gateway, release) = GatedGateway::new("unused");
    let mut orchestrator = Orchestrator::new(Arc::clone(&gateway) as Arc<dyn AiGateway>);
    let mut surface = attached_surface();

    orchestrator.generate_job(&mut surface);
    release.send(Ok(sky_gardener())).unwrap();
    orchestrator.wait_for_reply(WAIT);

    orchestrator.generate_job(&mut surface);
    surface.start_stroke(Point::new(10.0, 10.0));
    surface.end_stroke();
    assert!(!orchestrator.check_drawing(&surface));
    assert_eq!(gateway.drawing_calls.load(Ordering::SeqCst), 0);

    release.send(Ok(sky_gardener())).unwrap();
    orchestrator.wait_for_reply(WAIT);
}

#[test]
fn one_stroke_earns_the_compliment() {
    let (gateway, release) = GatedGateway::new("Great floating garden design!");
    let mut orchestrator = Orchestrator::new(Arc::clone(&gateway) as Arc<dyn AiGateway>);
    let mut surface = attached_surface();

    orchestrator.generate_job(&mut surface);
    release.send(Ok(sky_gardener())).unwrap();
    orchestrator.wait_for_reply(WAIT);

    surface.start_stroke(Point::new(20.0, 20.0));
    surface.extend_stroke(Point::new(80.0, 60.0));
    surface.end_stroke();
    assert!(orchestrator.check_drawing(&surface));
    assert!(orchestrator.wait_for_reply(WAIT));

    let state = orchestrator.state();
    assert_eq!(
        state.compliment.as_deref(),
        Some("Great floating garden design!")
    );
    assert_eq!(state.error, None);
    assert_eq!(state.analysis_error(), None);
}

#[test]
fn untouched_canvas_never_reaches_gateway() {
    let (gateway, release) = GatedGateway::new("should not be used");
    let mut orchestrator = Orchestrator::new(Arc::clone(&gateway) as Arc<dyn AiGateway>);
    let mut surface = attached_surface();

    orchestrator.generate_job(&mut surface);
    release.send(Ok(sky_gardener())).unwrap();
    orchestrator.wait_for_reply(WAIT);

    assert!(orchestrator.check_drawing(&surface));
    let state = orchestrator.state();
    assert_eq!(state.notice, Some(Notice::DrawSomethingFirst));
    assert_eq!(state.notice.map(Notice::message), Some(DRAW_FIRST_MESSAGE));
    assert_eq!(state.compliment, None);
    assert_eq!(gateway.drawing_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn strokes_erased_by_clear_count_as_untouched() {
    let (gateway, release) = GatedGateway::new("should not be used");
    let mut orchestrator = Orchestrator::new(Arc::clone(&gateway) as Arc<dyn AiGateway>);
    let mut surface = attached_surface();

    orchestrator.generate_job(&mut surface);
    release.send(Ok(sky_gardener())).unwrap();
    orchestrator.wait_for_reply(WAIT);

    surface.start_stroke(Point::new(20.0, 20.0));
    surface.extend_stroke(Point::new(40.0, 40.0));
    surface.end_stroke();
    surface.clear();

    orchestrator.check_drawing(&surface);
    assert_eq!(orchestrator.state().notice, Some(Notice::DrawSomethingFirst));
    assert_eq!(gateway.drawing_calls.load(Ordering::SeqCst), 0);
}
