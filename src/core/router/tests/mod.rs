//! Capability router tests

mod support;

mod selection_tests;
