pub(crate) mod recover;
