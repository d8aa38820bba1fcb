pub(crate) mod host_subclass;
pub(crate) mod scintilla_handler;
