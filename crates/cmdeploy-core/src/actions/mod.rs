//! Concrete actions over the host seams and configuration files.

pub mod advisory;
pub mod app_pool;
pub mod complus;
pub mod parameters;
pub mod service;

pub use advisory::{VerboseAction, WarningAction};
pub use app_pool::{SetAppPoolPropertyAction, StartAppPoolAction, StopAppPoolAction};
pub use complus::{DisableComPlusAction, EnableComPlusAction};
pub use parameters::SetParameterAction;
pub use service::{
    BackupServicesAction, SetServiceStartupTypeAction, StartServiceAction, StopServiceAction,
};
