//! Layout contract checks for the Slint window.
