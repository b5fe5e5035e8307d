// src/services/scope_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ScopeRepository,
    models::auth::Actor,
};

/// Tipos de registro que passam pelo resolvedor de escopo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Client,
    Contract,
    Portfolio,
    Debtor,
    Obligation,
    Program,
    Assignment,
    Management,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::User,
        EntityKind::Client,
        EntityKind::Contract,
        EntityKind::Portfolio,
        EntityKind::Debtor,
        EntityKind::Obligation,
        EntityKind::Program,
        EntityKind::Assignment,
        EntityKind::Management,
    ];
}

/// Subconjunto de registros que um usuário pode ver/alterar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Só superusuários.
    Unrestricted,
    /// A cadeia de propriedade termina neste tenant.
    Tenant(Uuid),
    /// Apenas o próprio registro de usuário.
    SelfOnly(Uuid),
    /// Registros ligados a atribuições deste agente, dentro do tenant dele.
    AgentAssigned { agent_id: Uuid, tenant_id: Uuid },
    /// Nada.
    Empty,
}

/// De onde um registro "pertence": os tenants que alcançam o registro pela cadeia
/// de propriedade, o usuário que ele representa e os agentes atribuídos a ele.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct Ownership {
    /// Tenant gravado na própria linha (quem cadastrou).
    pub tenant_id: Option<Uuid>,
    pub tenant_ids: Vec<Uuid>,
    pub user_id: Option<Uuid>,
    pub agent_ids: Vec<Uuid>,
    /// Tenants donos de linhas que a remoção levaria junto (só devedores têm).
    #[sqlx(default)]
    pub dependent_tenant_ids: Vec<Uuid>,
}

impl Ownership {
    /// O tenant alcança o registro pela cadeia de propriedade.
    pub fn reaches(&self, tenant_id: Uuid) -> bool {
        self.tenant_ids.contains(&tenant_id)
    }

    fn owned_by(&self, tenant_id: Uuid) -> bool {
        self.tenant_id == Some(tenant_id)
    }

    fn has_foreign_dependents(&self) -> bool {
        self.dependent_tenant_ids.iter().any(|t| self.tenant_id != Some(*t))
    }
}

impl Scope {
    /// Leitura: basta o tenant alcançar o registro.
    pub fn admits(&self, owner: &Ownership) -> bool {
        match *self {
            Scope::Unrestricted => true,
            Scope::Tenant(tenant_id) => owner.reaches(tenant_id),
            Scope::SelfOnly(user_id) => owner.user_id == Some(user_id),
            Scope::AgentAssigned { agent_id, tenant_id } => {
                owner.reaches(tenant_id) && owner.agent_ids.contains(&agent_id)
            }
            Scope::Empty => false,
        }
    }

    /// Escrita: o registro precisa ser do próprio tenant. Um devedor compartilhado
    /// só é alterado por quem o cadastrou.
    pub fn admits_write(&self, owner: &Ownership) -> bool {
        match *self {
            Scope::Tenant(tenant_id) => owner.owned_by(tenant_id),
            Scope::AgentAssigned { agent_id, tenant_id } => {
                owner.owned_by(tenant_id) && owner.agent_ids.contains(&agent_id)
            }
            _ => self.admits(owner),
        }
    }

    /// Remoção: além da escrita, a cascata não pode alcançar outro tenant.
    pub fn admits_delete(&self, owner: &Ownership) -> bool {
        match *self {
            Scope::Unrestricted => true,
            _ => self.admits_write(owner) && !owner.has_foreign_dependents(),
        }
    }
}

/// Resolve o escopo de um usuário para um tipo de registro. Função pura.
///
/// Admin/Supervisor sem tenant caem na política de agente: nunca há acesso global
/// sem ser superusuário.
pub fn resolve_scope(actor: &Actor, kind: EntityKind) -> Scope {
    if actor.is_superuser {
        return Scope::Unrestricted;
    }
    if actor.is_staff() {
        if let Some(tenant_id) = actor.tenant_id {
            return Scope::Tenant(tenant_id);
        }
    }
    agent_policy(actor, kind)
}

fn agent_policy(actor: &Actor, kind: EntityKind) -> Scope {
    match kind {
        EntityKind::User => Scope::SelfOnly(actor.id),
        // Agentes não enxergam clientes, contratos nem carteiras.
        EntityKind::Client | EntityKind::Contract | EntityKind::Portfolio => Scope::Empty,
        EntityKind::Debtor
        | EntityKind::Obligation
        | EntityKind::Program
        | EntityKind::Assignment
        | EntityKind::Management => match actor.tenant_id {
            Some(tenant_id) => Scope::AgentAssigned { agent_id: actor.id, tenant_id },
            None => Scope::Empty,
        },
    }
}

// =============================================================================
//  Verificação de registros individuais
// =============================================================================

#[derive(Clone)]
pub struct ScopeService {
    repo: ScopeRepository,
}

impl ScopeService {
    pub fn new(repo: ScopeRepository) -> Self {
        Self { repo }
    }

    /// Garante que o registro existe e está no escopo do usuário.
    /// Fora do escopo é indistinguível de inexistente.
    pub async fn ensure_visible(
        &self,
        actor: &Actor,
        kind: EntityKind,
        id: Uuid,
    ) -> Result<Ownership, AppError> {
        let owner = self.repo.ownership(kind, id).await?.ok_or(AppError::NotFound)?;

        if !resolve_scope(actor, kind).admits(&owner) {
            tracing::debug!(actor = %actor.id, ?kind, %id, "registro fora do escopo");
            return Err(AppError::NotFound);
        }
        Ok(owner)
    }

    /// Visível e alterável. Visível mas de outro tenant vira `Forbidden`.
    pub async fn ensure_writable(
        &self,
        actor: &Actor,
        kind: EntityKind,
        id: Uuid,
    ) -> Result<Ownership, AppError> {
        let owner = self.ensure_visible(actor, kind, id).await?;

        if !resolve_scope(actor, kind).admits_write(&owner) {
            tracing::debug!(actor = %actor.id, ?kind, %id, "escrita negada: registro de outro tenant");
            return Err(AppError::Forbidden);
        }
        Ok(owner)
    }

    pub async fn ensure_deletable(
        &self,
        actor: &Actor,
        kind: EntityKind,
        id: Uuid,
    ) -> Result<Ownership, AppError> {
        let owner = self.ensure_writable(actor, kind, id).await?;

        if !resolve_scope(actor, kind).admits_delete(&owner) {
            tracing::debug!(actor = %actor.id, ?kind, %id, "remoção negada: dependentes em outro tenant");
            return Err(AppError::Forbidden);
        }
        Ok(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Group;

    fn actor(groups: &[Group], tenant_id: Option<Uuid>, is_superuser: bool) -> Actor {
        Actor { id: Uuid::new_v4(), tenant_id, is_superuser, groups: groups.to_vec() }
    }

    fn owned_by(tenants: &[Uuid]) -> Ownership {
        Ownership {
            tenant_id: tenants.first().copied(),
            tenant_ids: tenants.to_vec(),
            ..Ownership::default()
        }
    }

    #[test]
    fn superuser_sees_every_kind() {
        let root = actor(&[], None, true);
        let owner = owned_by(&[Uuid::new_v4()]);
        for kind in EntityKind::ALL {
            let scope = resolve_scope(&root, kind);
            assert_eq!(scope, Scope::Unrestricted);
            assert!(scope.admits(&owner));
            assert!(scope.admits(&Ownership::default()));
        }
    }

    #[test]
    fn staff_with_tenant_sees_exactly_their_tenant() {
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();
        let records = [
            (owned_by(&[tenant_a]), true),
            (owned_by(&[tenant_b]), false),
            // Devedor cadastrado por B mas com obrigação em A: leitura liberada.
            (owned_by(&[tenant_b, tenant_a]), true),
            (owned_by(&[]), false),
        ];

        for group in [Group::Admin, Group::Supervisor] {
            let staff = actor(&[group], Some(tenant_a), false);
            for kind in EntityKind::ALL {
                let scope = resolve_scope(&staff, kind);
                assert_eq!(scope, Scope::Tenant(tenant_a));
                for (owner, expected) in &records {
                    assert_eq!(scope.admits(owner), *expected, "{group:?} {kind:?} {owner:?}");
                }
            }
        }
    }

    #[test]
    fn only_superusers_are_unrestricted() {
        let tenant = Some(Uuid::new_v4());
        let candidates = [
            actor(&[Group::Admin], tenant, false),
            actor(&[Group::Admin], None, false),
            actor(&[Group::Supervisor, Group::Agent], None, false),
            actor(&[Group::Agent], tenant, false),
            actor(&[], None, false),
        ];
        for candidate in &candidates {
            for kind in EntityKind::ALL {
                assert_ne!(resolve_scope(candidate, kind), Scope::Unrestricted);
            }
        }
    }

    #[test]
    fn agents_get_named_policies() {
        let tenant_id = Uuid::new_v4();
        let agent = actor(&[Group::Agent], Some(tenant_id), false);

        assert_eq!(resolve_scope(&agent, EntityKind::User), Scope::SelfOnly(agent.id));
        for kind in [EntityKind::Client, EntityKind::Contract, EntityKind::Portfolio] {
            assert_eq!(resolve_scope(&agent, kind), Scope::Empty);
        }
        for kind in [
            EntityKind::Debtor,
            EntityKind::Obligation,
            EntityKind::Program,
            EntityKind::Assignment,
            EntityKind::Management,
        ] {
            assert_eq!(
                resolve_scope(&agent, kind),
                Scope::AgentAssigned { agent_id: agent.id, tenant_id }
            );
        }
    }

    #[test]
    fn staff_without_tenant_falls_back_to_agent_policy() {
        let admin = actor(&[Group::Admin], None, false);
        assert_eq!(resolve_scope(&admin, EntityKind::Client), Scope::Empty);
        assert_eq!(resolve_scope(&admin, EntityKind::Debtor), Scope::Empty);
        assert_eq!(resolve_scope(&admin, EntityKind::User), Scope::SelfOnly(admin.id));
    }

    #[test]
    fn agent_assigned_requires_both_agent_and_tenant() {
        let tenant_id = Uuid::new_v4();
        let agent_id = Uuid::new_v4();
        let scope = Scope::AgentAssigned { agent_id, tenant_id };

        let mut owner = owned_by(&[tenant_id]);
        assert!(!scope.admits(&owner));
        owner.agent_ids.push(agent_id);
        assert!(scope.admits(&owner));

        let elsewhere = Ownership { agent_ids: vec![agent_id], ..owned_by(&[Uuid::new_v4()]) };
        assert!(!scope.admits(&elsewhere));
    }

    #[test]
    fn self_only_matches_the_user_row() {
        let me = Uuid::new_v4();
        let scope = Scope::SelfOnly(me);
        assert!(scope.admits(&Ownership { user_id: Some(me), ..Ownership::default() }));
        assert!(!scope.admits(&Ownership { user_id: Some(Uuid::new_v4()), ..Ownership::default() }));
        assert!(!Scope::Empty.admits(&Ownership { user_id: Some(me), ..Ownership::default() }));
    }

    // Devedor cadastrado por A, com obrigações em A e em B.
    fn shared_debtor(tenant_a: Uuid, tenant_b: Uuid) -> Ownership {
        Ownership {
            tenant_id: Some(tenant_a),
            tenant_ids: vec![tenant_a, tenant_b],
            dependent_tenant_ids: vec![tenant_a, tenant_b],
            ..Ownership::default()
        }
    }

    #[test]
    fn shared_debtor_is_read_only_for_the_other_tenant() {
        let (tenant_a, tenant_b) = (Uuid::new_v4(), Uuid::new_v4());
        let debtor = shared_debtor(tenant_a, tenant_b);

        for group in [Group::Admin, Group::Supervisor] {
            let staff_b = actor(&[group], Some(tenant_b), false);
            let scope = resolve_scope(&staff_b, EntityKind::Debtor);
            assert!(scope.admits(&debtor));
            assert!(!scope.admits_write(&debtor));
            assert!(!scope.admits_delete(&debtor));
        }
    }

    #[test]
    fn registering_tenant_edits_but_cannot_cascade_into_another_tenant() {
        let (tenant_a, tenant_b) = (Uuid::new_v4(), Uuid::new_v4());
        let admin_a = actor(&[Group::Admin], Some(tenant_a), false);
        let scope = resolve_scope(&admin_a, EntityKind::Debtor);

        let debtor = shared_debtor(tenant_a, tenant_b);
        assert!(scope.admits_write(&debtor));
        assert!(!scope.admits_delete(&debtor));

        // Só com dependentes do próprio tenant a remoção passa.
        let local = Ownership { dependent_tenant_ids: vec![tenant_a], ..debtor };
        assert!(scope.admits_delete(&local));
    }

    #[test]
    fn superuser_may_remove_shared_records() {
        let (tenant_a, tenant_b) = (Uuid::new_v4(), Uuid::new_v4());
        let root = actor(&[], None, true);
        let scope = resolve_scope(&root, EntityKind::Debtor);
        assert!(scope.admits_write(&shared_debtor(tenant_a, tenant_b)));
        assert!(scope.admits_delete(&shared_debtor(tenant_a, tenant_b)));
    }

    #[test]
    fn writes_follow_reads_for_single_tenant_records() {
        let (tenant_a, tenant_b) = (Uuid::new_v4(), Uuid::new_v4());
        let admin_a = actor(&[Group::Admin], Some(tenant_a), false);
        for kind in EntityKind::ALL {
            let scope = resolve_scope(&admin_a, kind);
            assert!(scope.admits_delete(&owned_by(&[tenant_a])), "{kind:?}");
            assert!(!scope.admits_write(&owned_by(&[tenant_b])), "{kind:?}");
        }
    }

    #[test]
    fn agent_writes_need_the_row_in_their_tenant() {
        let (tenant_a, tenant_b) = (Uuid::new_v4(), Uuid::new_v4());
        let agent = actor(&[Group::Agent], Some(tenant_b), false);
        let scope = resolve_scope(&agent, EntityKind::Debtor);

        let mut debtor = shared_debtor(tenant_a, tenant_b);
        debtor.agent_ids.push(agent.id);
        assert!(scope.admits(&debtor));
        assert!(!scope.admits_write(&debtor));

        let management = Ownership { agent_ids: vec![agent.id], ..owned_by(&[tenant_b]) };
        assert!(resolve_scope(&agent, EntityKind::Management).admits_write(&management));
    }

    #[test]
    fn reaches_covers_every_tenant_in_the_chain() {
        let (tenant_a, tenant_b) = (Uuid::new_v4(), Uuid::new_v4());
        let debtor = shared_debtor(tenant_a, tenant_b);
        assert!(debtor.reaches(tenant_a));
        assert!(debtor.reaches(tenant_b));
        assert!(!debtor.reaches(Uuid::new_v4()));
    }
}
