//! Layered viewer for attack-surface flow snapshots: ingest edge records,
//! place nodes on a stage grid, and drive the interactive canvas.

pub mod feed;
pub mod graph;
pub mod gui;
pub mod persistence;
pub mod view;
