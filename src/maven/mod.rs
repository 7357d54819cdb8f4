//! Maven descriptor model

mod pom;

pub use pom::{ParentRef, PomDependency, PomDocument, PomError, PomPlugin, PomProperty};
