mod event_flow_tests;
mod view_state_tests;
