use wortschatz_types::{Role, View};

use crate::state::ViewState;

#[test]
fn default_view_is_search() {
    let views = ViewState::default();
    assert_eq!(views.active, View::Search);
    assert!(views.search.result.is_none());
    assert!(!views.search.pending);
    assert!(views.chat.transcript.is_empty());
    assert!(views.notice.is_none());
}

#[test]
fn transcript_timestamps_never_decrease() {
    let mut views = ViewState::default();

    views.chat.append(Role::User, "erste".to_string());
    // simulate a wall clock that stepped backwards relative to this message
    let skewed = views.chat.transcript[0].sent_at + 60_000;
    views.chat.transcript[0].sent_at = skewed;

    let next = views.chat.append(Role::Assistant, "zweite".to_string());
    assert!(next.sent_at >= skewed);
}

#[test]
fn notice_preemption_invalidates_old_expiry() {
    let mut views = ViewState::default();

    let first = views.begin_notice("first".to_string());
    let second = views.begin_notice("second".to_string());
    assert_ne!(first, second);
    assert_eq!(views.notice.as_ref().unwrap().text, "second");

    // expiry of the preempted notice must not clear the new one
    assert!(!views.clear_notice_if(first));
    assert_eq!(views.notice.as_ref().unwrap().text, "second");

    assert!(views.clear_notice_if(second));
    assert!(views.notice.is_none());
}

#[test]
fn clearing_with_no_notice_is_a_no_op() {
    let mut views = ViewState::default();
    assert!(!views.clear_notice_if(1));
}
