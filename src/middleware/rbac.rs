// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{Actor, Group},
};

/// 1. O Trait que define uma exigência de grupo
pub trait GroupRequirement: Send + Sync + 'static {
    fn name() -> &'static str;
    fn allows(actor: &Actor) -> bool;
}

/// Admin, Supervisor ou superusuário. Exigido para escrever no cadastro.
pub struct Staff;

impl GroupRequirement for Staff {
    fn name() -> &'static str {
        "Staff"
    }

    fn allows(actor: &Actor) -> bool {
        actor.is_superuser || actor.is_staff()
    }
}

pub struct AdminOnly;

impl GroupRequirement for AdminOnly {
    fn name() -> &'static str {
        "Admin"
    }

    fn allows(actor: &Actor) -> bool {
        actor.is_superuser || actor.has_group(Group::Admin)
    }
}

pub struct SuperuserOnly;

impl GroupRequirement for SuperuserOnly {
    fn name() -> &'static str {
        "Superuser"
    }

    fn allows(actor: &Actor) -> bool {
        actor.is_superuser
    }
}

/// 2. O Extractor (Guardião). Devolve o Actor já verificado.
pub struct RequireGroup<T>(pub Actor, pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireGroup<T>
where
    T: GroupRequirement,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .extensions
            .get::<Actor>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        if !T::allows(&actor) {
            tracing::debug!(actor = %actor.id, required = T::name(), "grupo insuficiente");
            return Err(AppError::Forbidden);
        }

        Ok(RequireGroup(actor, PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn actor(groups: &[Group], is_superuser: bool) -> Actor {
        Actor { id: Uuid::new_v4(), tenant_id: Some(Uuid::new_v4()), is_superuser, groups: groups.to_vec() }
    }

    #[test]
    fn staff_requires_admin_or_supervisor() {
        assert!(Staff::allows(&actor(&[Group::Supervisor], false)));
        assert!(Staff::allows(&actor(&[Group::Admin], false)));
        assert!(Staff::allows(&actor(&[], true)));
        assert!(!Staff::allows(&actor(&[Group::Agent], false)));
    }

    #[test]
    fn admin_and_superuser_requirements() {
        assert!(!AdminOnly::allows(&actor(&[Group::Supervisor], false)));
        assert!(AdminOnly::allows(&actor(&[Group::Admin], false)));
        assert!(!SuperuserOnly::allows(&actor(&[Group::Admin], false)));
        assert!(SuperuserOnly::allows(&actor(&[], true)));
    }
}
