// Dashkit - A pluggable dashboard widget engine built with Rust
// Copyright (C) 2026 Dashkit Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, WidgetError};
use crate::models::declaration::WidgetDeclaration;
use crate::models::identity::UserIdentityAccessor;
use crate::models::placement::WidgetPlacement;
use crate::models::state::ComponentStateSerializer;
use crate::models::widget::WidgetComponent;

/// Storage for per-user widget placements and their serialized state.
#[async_trait]
pub trait WidgetPersister: Send + Sync {
    async fn load_placements(
        &self,
        namespace: &str,
        user_id: i64,
    ) -> anyhow::Result<Vec<WidgetPlacement>>;

    /// Persists the placement and returns its id.
    async fn insert_placement(&self, placement: &WidgetPlacement) -> anyhow::Result<i64>;

    async fn remove_placement(&self, user_id: i64, placement_id: i64) -> anyhow::Result<()>;

    async fn save_state(
        &self,
        user_id: i64,
        placement_id: i64,
        state: &[u8],
    ) -> anyhow::Result<()>;
}

/// A placed widget restored for the current user.
///
/// `state_error` carries the message of a failed state restore; the widget
/// is still delivered with its default state so one corrupt blob cannot
/// take down the rest of the dashboard.
pub struct PlacedWidget {
    pub placement: WidgetPlacement,
    pub component: Box<dyn WidgetComponent>,
    pub state_error: Option<String>,
}

/// Persistence logic shared by the eager and lazy registries: placement
/// lookups for the uniqueness filter, uniqueness-checked placement, and
/// state capture/restore through the configured serializer.
pub struct PlacementCoordinator {
    namespace: String,
    identity: Arc<dyn UserIdentityAccessor>,
    persister: Arc<dyn WidgetPersister>,
    serializer: Arc<dyn ComponentStateSerializer>,
}

impl PlacementCoordinator {
    pub fn new(
        namespace: impl Into<String>,
        identity: Arc<dyn UserIdentityAccessor>,
        persister: Arc<dyn WidgetPersister>,
        serializer: Arc<dyn ComponentStateSerializer>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            identity,
            persister,
            serializer,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The current user's placements. Fails with `NoActiveUser` when
    /// nobody is authenticated.
    pub async fn placements(&self) -> Result<Vec<WidgetPlacement>> {
        let user_id = self.identity.current_user_id()?;
        Ok(self
            .persister
            .load_placements(&self.namespace, user_id)
            .await?)
    }

    /// Type ids of the current user's placements.
    pub async fn user_type_ids(&self) -> Result<HashSet<String>> {
        Ok(self
            .placements()
            .await?
            .into_iter()
            .map(|placement| placement.widget_type_id)
            .collect())
    }

    /// Like [`user_type_ids`], but an unauthenticated caller is treated as
    /// having no placements. Availability queries use this so anonymous
    /// visitors still see the catalogue.
    ///
    /// [`user_type_ids`]: Self::user_type_ids
    pub async fn user_type_ids_or_empty(&self) -> Result<HashSet<String>> {
        match self.user_type_ids().await {
            Ok(type_ids) => Ok(type_ids),
            Err(WidgetError::NoActiveUser) => Ok(HashSet::new()),
            Err(err) => Err(err),
        }
    }

    /// Places the widget for the current user, enforcing uniqueness, and
    /// persists its initial state.
    pub async fn place(&self, declaration: &WidgetDeclaration) -> Result<PlacedWidget> {
        let user_id = self.identity.current_user_id()?;

        if declaration.is_unique() {
            let placements = self
                .persister
                .load_placements(&self.namespace, user_id)
                .await?;
            if placements
                .iter()
                .any(|placement| placement.widget_type_id == declaration.type_id())
            {
                return Err(WidgetError::IllegalOperation(format!(
                    "unique widget '{}' is already placed",
                    declaration.type_id()
                )));
            }
        }

        let component = declaration.create_instance()?;
        let state = self.serializer.serialize_state(component.as_ref())?;
        let mut placement = WidgetPlacement::new(self.namespace.clone(), user_id, declaration.type_id())
            .with_state(state);
        let id = self.persister.insert_placement(&placement).await?;
        placement.id = Some(id);

        Ok(PlacedWidget {
            placement,
            component,
            state_error: None,
        })
    }

    pub async fn remove(&self, placement_id: i64) -> Result<()> {
        let user_id = self.identity.current_user_id()?;
        Ok(self.persister.remove_placement(user_id, placement_id).await?)
    }

    pub async fn save_state(
        &self,
        placement_id: i64,
        widget: &dyn WidgetComponent,
    ) -> Result<()> {
        let user_id = self.identity.current_user_id()?;
        let state = self.serializer.serialize_state(widget)?;
        Ok(self
            .persister
            .save_state(user_id, placement_id, &state)
            .await?)
    }

    /// Builds the widget for a placement and restores its persisted state.
    /// A failing restore is recorded on the result instead of aborting.
    pub fn restore(
        &self,
        declaration: &WidgetDeclaration,
        placement: WidgetPlacement,
    ) -> Result<PlacedWidget> {
        let mut component = declaration.create_instance()?;
        let state_error = match placement.state.as_deref() {
            Some(bytes) => match self.serializer.restore_state(component.as_mut(), bytes) {
                Ok(()) => None,
                Err(err) => {
                    tracing::warn!(
                        "failed to restore state of widget '{}' (placement {:?}): {}",
                        placement.widget_type_id,
                        placement.id,
                        err
                    );
                    Some(err.to_string())
                }
            },
            None => None,
        };

        Ok(PlacedWidget {
            placement,
            component,
            state_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::identity::FixedUserIdentity;
    use crate::models::state::JsonStateSerializer;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    struct CounterWidget {
        count: i64,
    }

    impl WidgetComponent for CounterWidget {
        fn save_state(&self) -> Value {
            json!({ "count": self.count })
        }

        fn load_state(&mut self, state: &Value) -> std::result::Result<(), String> {
            match state.get("count").and_then(|v| v.as_i64()) {
                Some(count) => {
                    self.count = count;
                    Ok(())
                }
                None => Err("missing count".to_string()),
            }
        }
    }

    struct NoUserIdentity;

    impl UserIdentityAccessor for NoUserIdentity {
        fn current_user_id(&self) -> Result<i64> {
            Err(WidgetError::NoActiveUser)
        }
    }

    #[derive(Default)]
    struct MemoryPersister {
        placements: Mutex<Vec<WidgetPlacement>>,
        next_id: AtomicI64,
    }

    #[async_trait]
    impl WidgetPersister for MemoryPersister {
        async fn load_placements(
            &self,
            namespace: &str,
            user_id: i64,
        ) -> anyhow::Result<Vec<WidgetPlacement>> {
            Ok(self
                .placements
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.namespace == namespace && p.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn insert_placement(&self, placement: &WidgetPlacement) -> anyhow::Result<i64> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let mut stored = placement.clone();
            stored.id = Some(id);
            self.placements.lock().unwrap().push(stored);
            Ok(id)
        }

        async fn remove_placement(&self, user_id: i64, placement_id: i64) -> anyhow::Result<()> {
            self.placements
                .lock()
                .unwrap()
                .retain(|p| !(p.id == Some(placement_id) && p.user_id == user_id));
            Ok(())
        }

        async fn save_state(
            &self,
            user_id: i64,
            placement_id: i64,
            state: &[u8],
        ) -> anyhow::Result<()> {
            for placement in self.placements.lock().unwrap().iter_mut() {
                if placement.id == Some(placement_id) && placement.user_id == user_id {
                    placement.state = Some(state.to_vec());
                }
            }
            Ok(())
        }
    }

    fn counter_declaration(type_id: &str, unique: bool) -> WidgetDeclaration {
        WidgetDeclaration::new(type_id, unique, || {
            Ok(Box::new(CounterWidget { count: 0 }) as Box<dyn WidgetComponent>)
        })
    }

    fn coordinator(persister: Arc<MemoryPersister>) -> PlacementCoordinator {
        PlacementCoordinator::new(
            "default",
            Arc::new(FixedUserIdentity::new(7)),
            persister,
            Arc::new(JsonStateSerializer),
        )
    }

    #[tokio::test]
    async fn test_place_persists_initial_state() {
        let persister = Arc::new(MemoryPersister::default());
        let coordinator = coordinator(persister.clone());

        let placed = coordinator
            .place(&counter_declaration("clock", true))
            .await
            .unwrap();
        assert_eq!(placed.placement.id, Some(1));
        assert_eq!(placed.placement.widget_type_id, "clock");
        assert!(placed.state_error.is_none());

        let stored = persister.load_placements("default", 7).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].state, Some(b"{\"count\":0}".to_vec()));
    }

    #[tokio::test]
    async fn test_place_unique_twice_fails() {
        let persister = Arc::new(MemoryPersister::default());
        let coordinator = coordinator(persister);
        let declaration = counter_declaration("clock", true);

        coordinator.place(&declaration).await.unwrap();
        assert!(matches!(
            coordinator.place(&declaration).await,
            Err(WidgetError::IllegalOperation(_))
        ));
    }

    #[tokio::test]
    async fn test_place_non_unique_twice_succeeds() {
        let persister = Arc::new(MemoryPersister::default());
        let coordinator = coordinator(persister);
        let declaration = counter_declaration("notes", false);

        coordinator.place(&declaration).await.unwrap();
        coordinator.place(&declaration).await.unwrap();
        assert_eq!(coordinator.user_type_ids().await.unwrap().len(), 1);
        assert_eq!(coordinator.placements().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_user_type_ids_or_empty_without_user() {
        let coordinator = PlacementCoordinator::new(
            "default",
            Arc::new(NoUserIdentity),
            Arc::new(MemoryPersister::default()),
            Arc::new(JsonStateSerializer),
        );

        assert!(matches!(
            coordinator.user_type_ids().await,
            Err(WidgetError::NoActiveUser)
        ));
        assert!(coordinator.user_type_ids_or_empty().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_reloads_state() {
        let persister = Arc::new(MemoryPersister::default());
        let coordinator = coordinator(persister);

        let placement = WidgetPlacement::new("default", 7, "clock")
            .with_state(b"{\"count\":9}".to_vec());
        let placed = coordinator
            .restore(&counter_declaration("clock", true), placement)
            .unwrap();

        assert!(placed.state_error.is_none());
        assert_eq!(placed.component.save_state(), json!({"count": 9}));
    }

    #[tokio::test]
    async fn test_restore_captures_state_error() {
        let persister = Arc::new(MemoryPersister::default());
        let coordinator = coordinator(persister);

        let placement =
            WidgetPlacement::new("default", 7, "clock").with_state(b"garbage".to_vec());
        let placed = coordinator
            .restore(&counter_declaration("clock", true), placement)
            .unwrap();

        assert!(placed.state_error.is_some());
        assert_eq!(placed.component.save_state(), json!({"count": 0}));
    }

    #[tokio::test]
    async fn test_save_state_updates_persisted_placement() {
        let persister = Arc::new(MemoryPersister::default());
        let coordinator = coordinator(persister.clone());

        let placed = coordinator
            .place(&counter_declaration("clock", true))
            .await
            .unwrap();
        let widget = CounterWidget { count: 5 };
        coordinator
            .save_state(placed.placement.id.unwrap(), &widget)
            .await
            .unwrap();

        let stored = persister.load_placements("default", 7).await.unwrap();
        assert_eq!(stored[0].state, Some(b"{\"count\":5}".to_vec()));
    }

    #[tokio::test]
    async fn test_remove_deletes_placement() {
        let persister = Arc::new(MemoryPersister::default());
        let coordinator = coordinator(persister);

        let placed = coordinator
            .place(&counter_declaration("clock", true))
            .await
            .unwrap();
        coordinator.remove(placed.placement.id.unwrap()).await.unwrap();
        assert!(coordinator.placements().await.unwrap().is_empty());
    }
}
