pub(crate) mod login_session;
