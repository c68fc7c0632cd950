pub(crate) mod login_form;
pub(crate) mod protected_route;
pub(crate) mod session_panel;
