use super::{
    impl_operation, Operation, OperationContext, StartComponentsOperation, StopComponentsOperation,
};
use crate::actions::{SetAppPoolPropertyAction, SetParameterAction};
use crate::error::{DeployError, Result};
use crate::invoker::ActionInvoker;
use crate::types::{AuthenticationType, ComponentName};

pub const IDENTITY_TYPE_PROPERTY: &str = "identity_type";
pub const AUTHENTICATION_TYPE_PARAMETER: &str = "authentication_type";

/// Switches the security token service between windows and username
/// authentication: STS is stopped, its pool identity and the deployment's
/// input parameter are changed, then STS is started again.
#[derive(Debug)]
pub struct SetStsAuthenticationOperation {
    invoker: ActionInvoker,
}

impl_operation!(SetStsAuthenticationOperation);

impl SetStsAuthenticationOperation {
    pub fn new(ctx: &OperationContext, authentication: AuthenticationType) -> Result<Self> {
        if ctx.require_elevation && !ctx.host.catalog.is_elevated() {
            return Err(DeployError::ElevationRequired);
        }
        let pool = ctx.deployment.app_pool(ComponentName::Sts).ok_or_else(|| {
            DeployError::InvalidArgument("deployment has no STS application pool".to_string())
        })?;

        let mut invoker = ctx.invoker(format!(
            "Setting STS authentication of deployment '{}' to {authentication}",
            ctx.deployment.name
        ));
        let inner = ctx.composed();
        invoker.add_actions(
            StopComponentsOperation::new(&inner, &[ComponentName::Sts])?.into_actions(),
        );
        invoker.add_action(SetAppPoolPropertyAction::new(
            ctx.host.app_pools.clone(),
            pool,
            IDENTITY_TYPE_PROPERTY,
            authentication.app_pool_identity(),
        ));
        invoker.add_action(SetParameterAction::new(
            &ctx.input_parameters,
            AUTHENTICATION_TYPE_PARAMETER,
            authentication.as_str(),
        ));
        invoker.add_actions(
            StartComponentsOperation::new(&inner, &[ComponentName::Sts])?.into_actions(),
        );
        Ok(Self { invoker })
    }
}
