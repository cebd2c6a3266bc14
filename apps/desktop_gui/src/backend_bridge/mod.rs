//! Backend worker: a tokio runtime on its own thread driving the upload orchestrator.

use client_core::{HttpTransport, MemoryRegistry, UploadOrchestrator};

pub mod commands;
pub mod runtime;

pub type Orchestrator = UploadOrchestrator<MemoryRegistry, HttpTransport>;
