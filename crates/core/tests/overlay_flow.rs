use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use transit_core::bridge::{Ack, BackgroundService, ChannelMessenger, LocalRuntime, Message};
use transit_core::geometry::{Point, Rect, Viewport};
use transit_core::overlay::{HeadlessSurface, OverlayController, OverlayKind, OverlayState, OverlaySurface};
use transit_core::selection::{DEFAULT_DEBOUNCE, RawSelection, SelectionEvent, SelectionTracker};
use transit_core::{AppError, Result, Task, Translator};

struct Prefixing;

impl Translator for Prefixing {
    async fn translate(&self, text: &str, _task: Task) -> Result<String> {
        Ok(format!("<b>vi:</b> {}", text))
    }
}

struct Failing;

impl Translator for Failing {
    async fn translate(&self, _text: &str, _task: Task) -> Result<String> {
        Err(AppError::Api {
            status: 503,
            detail: None,
        })
    }
}

fn controller() -> OverlayController<HeadlessSurface> {
    OverlayController::new(HeadlessSurface::new(Viewport::new(1280.0, 800.0)))
}

fn selection(text: &str, x: f64, y: f64) -> SelectionEvent {
    SelectionEvent::Captured(transit_core::selection::SelectionSnapshot {
        text: text.to_string(),
        rect: Rect::from_xywh(x, y, 140.0, 18.0),
    })
}

#[tokio::test]
async fn at_most_one_overlay_element_through_a_session() {
    let mut c = controller();

    c.on_selection(selection("Hello world", 100.0, 100.0));
    assert_eq!(c.surface().mounted_count(), 1);
    assert!(c.surface().is_mounted(OverlayKind::Icon));

    let ticket = c.on_icon_click().expect("icon click starts a translation");
    assert_eq!(c.surface().mounted_count(), 1);
    assert!(c.surface().is_mounted(OverlayKind::Loading));

    // Shift while loading is ignored.
    assert!(c.on_shift_down().is_none());
    c.on_shift_up();

    assert!(c.complete_translation(ticket, Prefixing.translate("Hello world", Task::Translate).await));
    assert_eq!(c.surface().mounted_count(), 1);
    assert!(c.surface().is_mounted(OverlayKind::Tooltip));

    // A new selection leaves the result alone until it is dismissed.
    c.on_selection(selection("Another line", 600.0, 500.0));
    assert!(c.surface().is_mounted(OverlayKind::Tooltip));
    c.on_document_click(Point::new(5.0, 5.0));
    assert_eq!(c.surface().mounted_count(), 0);

    c.on_selection(selection("Another line", 600.0, 500.0));
    assert_eq!(c.surface().mounted_count(), 1);
    assert!(c.surface().is_mounted(OverlayKind::Icon));

    assert!(c.translate_with(&Prefixing, Task::Translate).await);
    assert_eq!(c.surface().mounted_count(), 1);
    match c.state() {
        OverlayState::Result { text, is_error, rect } => {
            assert_eq!(text, "<b>vi:</b> Another line");
            assert!(!is_error);
            assert_eq!(rect.x, 600.0);
        }
        other => panic!("expected result, got {:?}", other),
    }

    c.on_document_click(Point::new(5.0, 5.0));
    assert_eq!(c.surface().mounted_count(), 0);
}

#[tokio::test]
async fn icon_shown_after_abandoned_bridge_request_still_translates() {
    let service = BackgroundService::new(Prefixing, ChannelMessenger::new());
    let mut inbox = service.messenger().register(3);
    let runtime = LocalRuntime::new(&service, 3);

    let mut c = controller();
    c.on_selection(selection("First", 100.0, 100.0));
    c.request_via(&runtime).await.expect("first request was sent");
    let late = inbox.try_recv().expect("first reply delivered");

    c.on_selection(SelectionEvent::Clear);
    c.on_selection(selection("Second", 400.0, 300.0));
    assert!(c.surface().is_mounted(OverlayKind::Icon));

    // The abandoned reply arrives after the new icon is up.
    c.on_message(late);
    assert!(c.surface().is_mounted(OverlayKind::Icon));

    let ticket = c.on_icon_click().expect("icon click starts a translation");
    assert_eq!(ticket.text, "Second");
}

#[tokio::test]
async fn provider_error_is_shown_as_plain_text() {
    let mut c = controller();
    c.on_selection(selection("Hello", 100.0, 100.0));

    assert!(c.translate_with(&Failing, Task::Translate).await);
    let tooltip = c.surface().element(OverlayKind::Tooltip).unwrap();
    assert!(!tooltip.content.is_markup());
    assert_eq!(tooltip.content.as_str(), "Error: API Request failed: Status: 503");
}

#[tokio::test]
async fn translation_round_trips_through_background_service() {
    let service = BackgroundService::new(Prefixing, ChannelMessenger::new());
    let mut inbox = service.messenger().register(7);
    let runtime = LocalRuntime::new(&service, 7);

    let mut c = controller();
    c.on_selection(selection("Good morning", 200.0, 300.0));

    let ack = c.request_via(&runtime).await.expect("request was sent");
    assert_eq!(ack, Ack::ok());
    assert!(matches!(c.state(), OverlayState::Loading(_)));

    let reply = inbox.try_recv().expect("display message delivered");
    assert_eq!(reply.action(), "displayTranslation");
    assert_eq!(c.on_message(reply), Ack::ok());

    match c.state() {
        OverlayState::Result { text, is_error, .. } => {
            assert_eq!(text, "<b>vi:</b> Good morning");
            assert!(!is_error);
        }
        other => panic!("expected result, got {:?}", other),
    }
    assert_eq!(c.surface().mounted_count(), 1);
}

#[tokio::test]
async fn failed_translation_is_delivered_as_error_message() {
    let service = BackgroundService::new(Failing, ChannelMessenger::new());
    let mut inbox = service.messenger().register(1);

    let ack = service
        .handle(
            Message::TranslateText {
                text: "Hello".to_string(),
                rect: Some(Rect::from_xywh(10.0, 10.0, 50.0, 10.0)),
                request_id: None,
            },
            1,
        )
        .await;
    assert!(!ack.success);

    match inbox.try_recv().unwrap() {
        Message::DisplayTranslationError { error_message, .. } => {
            assert_eq!(error_message, "Failed to get translation: API Request failed: Status: 503");
        }
        other => panic!("expected error display, got {:?}", other),
    }
}

#[tokio::test]
async fn undeliverable_error_reply_still_acks_failure() {
    let service = BackgroundService::new(Failing, ChannelMessenger::new());

    // Nobody registered tab 9: both the result and the error reply fail.
    let ack = service
        .handle(
            Message::TranslatePdfText {
                text: "Hello".to_string(),
                request_id: None,
            },
            9,
        )
        .await;

    assert!(!ack.success);
    assert!(ack.error.unwrap().contains("503"));
}

#[tokio::test]
async fn requests_without_text_are_rejected_without_translating() {
    let service = BackgroundService::new(Failing, ChannelMessenger::new());
    let mut inbox = service.messenger().register(2);

    let ack = service
        .handle(
            Message::TranslateText {
                text: "   ".to_string(),
                rect: Some(Rect::from_xywh(0.0, 0.0, 1.0, 1.0)),
                request_id: None,
            },
            2,
        )
        .await;
    assert_eq!(ack, Ack::failed("No text or selection area provided for translation."));

    let ack = service
        .handle(
            Message::TranslatePdfText {
                text: String::new(),
                request_id: None,
            },
            2,
        )
        .await;
    assert_eq!(ack, Ack::failed("No text provided for translation."));
    assert!(inbox.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn tracker_emits_only_the_settled_selection() {
    let (raw_tx, raw_rx) = mpsc::channel(8);
    let (event_tx, mut event_rx) = mpsc::channel(8);
    tokio::spawn(SelectionTracker::new(DEFAULT_DEBOUNCE).run(raw_rx, event_tx));

    let start = Instant::now();
    raw_tx
        .send(RawSelection::new("Hel", Rect::from_xywh(10.0, 10.0, 30.0, 18.0)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    raw_tx
        .send(RawSelection::new("Hello", Rect::from_xywh(10.0, 10.0, 50.0, 18.0)))
        .await
        .unwrap();

    let event = event_rx.recv().await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(200));

    let mut c = controller();
    c.on_selection(event);
    assert_eq!(c.snapshot().map(|s| s.text.as_str()), Some("Hello"));
    assert!(c.surface().is_mounted(OverlayKind::Icon));

    drop(raw_tx);
    assert!(event_rx.recv().await.is_none());
}
