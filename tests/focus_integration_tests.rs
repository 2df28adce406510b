//! Integration tests for ray focus delivery
//!
//! Drive ray events through a client on the in-memory transport and check
//! the exact enter/motion/leave callback sequences the application sees.

mod common;

use common::*;
use zsurface::{ErrorKind, RayEvent, SeatCapabilities, ServerEvent, SurfaceId, ViewId};

fn single_callback(client: &mut TestClient) -> Callback {
    let calls = client.handler_mut().take();
    assert_eq!(calls.len(), 1, "unexpected callbacks: {:?}", calls);
    calls.into_iter().next().unwrap()
}

#[test]
fn test_enter_motion_leave_sequence() {
    let mut client = ready_client();
    let window = client.create_toplevel(1.0, 1.0).unwrap();

    client.transport_mut().send_ray(enter(window, 0.1, 0.2));
    pump(&mut client);
    match single_callback(&mut client) {
        Callback::Enter(view, x, y) => {
            assert_eq!(view, ViewId::root(window));
            assert_close(x, 0.6);
            assert_close(y, 0.3);
        }
        other => panic!("expected enter, got {:?}", other),
    }
    assert_eq!(client.entered_toplevel(), Some(window));
    assert_eq!(client.entered_view(), Some(ViewId::root(window)));

    client.transport_mut().send_ray(motion(-0.25, 0.0));
    pump(&mut client);
    match single_callback(&mut client) {
        Callback::Motion(x, y) => {
            assert_close(x, 0.25);
            assert_close(y, 0.5);
        }
        other => panic!("expected motion, got {:?}", other),
    }

    client.transport_mut().send_ray(leave(window));
    pump(&mut client);
    assert_eq!(single_callback(&mut client), Callback::Leave);
    assert_eq!(client.entered_toplevel(), None);
    assert_eq!(client.entered_view(), None);
}

#[test]
fn test_motion_off_the_toplevel_leaves_once() {
    let mut client = ready_client();
    let window = client.create_toplevel(1.0, 1.0).unwrap();

    client.transport_mut().send_ray(enter(window, 0.0, 0.0));
    client.transport_mut().send_ray(motion(5.0, 0.0));
    client.transport_mut().send_ray(motion(6.0, 0.0));
    pump(&mut client);

    let calls = client.handler_mut().take();
    assert_eq!(calls.len(), 2, "unexpected callbacks: {:?}", calls);
    assert!(matches!(calls[0], Callback::Enter(..)));
    assert_eq!(calls[1], Callback::Leave);

    // the toplevel is still the entered one; moving back re-enters it
    assert_eq!(client.entered_toplevel(), Some(window));
    client.transport_mut().send_ray(motion(0.0, 0.0));
    pump(&mut client);
    assert!(matches!(single_callback(&mut client), Callback::Enter(..)));
}

#[test]
fn test_leave_after_miss_is_silent() {
    let mut client = ready_client();
    let window = client.create_toplevel(1.0, 1.0).unwrap();

    client.transport_mut().send_ray(enter(window, 3.0, 3.0));
    client.transport_mut().send_ray(leave(window));
    pump(&mut client);

    assert!(client.handler_mut().take().is_empty());
    assert_eq!(client.entered_toplevel(), None);
}

#[test]
fn test_motion_without_entered_toplevel_is_ignored() {
    let mut client = ready_client();
    client.create_toplevel(1.0, 1.0).unwrap();

    client.transport_mut().send_ray(motion(0.0, 0.0));
    pump(&mut client);

    assert!(client.handler_mut().take().is_empty());
}

#[test]
fn test_enter_on_unknown_surface_is_ignored() {
    let mut client = ready_client();
    client.create_toplevel(1.0, 1.0).unwrap();

    client.transport_mut().send_ray(enter(SurfaceId(999), 0.0, 0.0));
    client.transport_mut().send_ray(RayEvent::Enter {
        serial: 3,
        surface: None,
        origin: [0; 3],
        direction: [0; 3],
    });
    pump(&mut client);

    assert!(client.handler_mut().take().is_empty());
    assert_eq!(client.entered_toplevel(), None);
    assert_eq!(client.last_error(), None);
}

#[test]
fn test_switching_toplevels_leaves_then_enters() {
    let mut client = ready_client();
    let first = client.create_toplevel(1.0, 1.0).unwrap();
    let second = client.create_toplevel(1.0, 1.0).unwrap();

    client.transport_mut().send_ray(enter(first, 0.0, 0.0));
    client.transport_mut().send_ray(enter(second, 0.0, 0.0));
    pump(&mut client);

    let calls = client.handler_mut().take();
    assert_eq!(calls.len(), 3, "unexpected callbacks: {:?}", calls);
    assert!(matches!(calls[0], Callback::Enter(view, ..) if view == ViewId::root(first)));
    assert_eq!(calls[1], Callback::Leave);
    assert!(matches!(calls[2], Callback::Enter(view, ..) if view == ViewId::root(second)));
    assert_eq!(client.entered_toplevel(), Some(second));
}

#[test]
fn test_button_events_pass_through() {
    let mut client = ready_client();
    client.transport_mut().send_ray(RayEvent::Button {
        serial: 7,
        time: 1234,
        button: 0x110,
        state: 1,
    });
    pump(&mut client);

    assert_eq!(
        single_callback(&mut client),
        Callback::Button(7, 1234, 0x110, 1)
    );
}

#[test]
fn test_destroying_entered_toplevel_clears_focus_silently() {
    let mut client = ready_client();
    let window = client.create_toplevel(1.0, 1.0).unwrap();

    client.transport_mut().send_ray(enter(window, 0.0, 0.0));
    pump(&mut client);
    client.handler_mut().take();

    assert!(client.destroy_toplevel(window));
    assert!(!client.destroy_toplevel(window));
    assert_eq!(client.entered_toplevel(), None);
    assert_eq!(client.entered_view(), None);
    assert!(client.handler_mut().take().is_empty());

    // stale motion for the destroyed toplevel is dropped
    client.transport_mut().send_ray(motion(0.0, 0.0));
    pump(&mut client);
    assert!(client.handler_mut().take().is_empty());
}

#[test]
fn test_losing_ray_capability_ends_focus() {
    let mut client = ready_client();
    let window = client.create_toplevel(1.0, 1.0).unwrap();

    client.transport_mut().send_ray(enter(window, 0.0, 0.0));
    pump(&mut client);
    client.handler_mut().take();

    client
        .transport_mut()
        .send(ServerEvent::SeatCapabilities(SeatCapabilities::KEYBOARD.bits()));
    pump(&mut client);

    assert_eq!(
        client.handler_mut().take(),
        vec![Callback::Leave, Callback::Seat(SeatCapabilities::KEYBOARD)]
    );
    assert!(!client.has_ray());
    assert!(!client.transport().ray_bound());

    // ray events after release go nowhere
    client.transport_mut().send_ray(enter(window, 0.0, 0.0));
    pump(&mut client);
    assert!(client.handler_mut().take().is_empty());
    assert_eq!(client.last_error(), None::<ErrorKind>);
}
