use crate::repository::Collection;
use crate::sync::{StoreContext, keys};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::messaging::UserType;
use shared::notification::{
    Channel, NotificationCategory, NotificationPreferences, PreferencesUpdate,
};

const PREFERENCES: Collection<NotificationPreferences> =
    Collection::new(keys::NOTIFICATION_PREFERENCES);

/// Per-user notification switches
#[derive(Debug, Clone)]
pub struct PreferenceService {
    ctx: StoreContext,
}

impl PreferenceService {
    pub fn new(ctx: StoreContext) -> Self {
        Self { ctx }
    }

    pub fn all(&self) -> AppResult<Vec<NotificationPreferences>> {
        PREFERENCES.load(&self.ctx)
    }

    pub fn get(&self, user_id: &str) -> AppResult<Option<NotificationPreferences>> {
        Ok(self.all()?.into_iter().find(|p| p.user_id == user_id))
    }

    /// Store defaults for a user; an existing record is returned untouched
    pub fn create_default(
        &self,
        user_id: &str,
        user_type: UserType,
    ) -> AppResult<NotificationPreferences> {
        if user_id.trim().is_empty() {
            return Err(AppError::validation("user_id must not be empty"));
        }
        if !user_type.has_preferences() {
            return Err(AppError::validation(format!(
                "{} users have no notification preferences",
                user_type.as_str()
            ))
            .with_detail("user_type", user_type.as_str()));
        }

        let _guard = self.ctx.exclusive();
        PREFERENCES.update(&self.ctx, |all| {
            if let Some(existing) = all.iter().find(|p| p.user_id == user_id) {
                return Ok(existing.clone());
            }
            let prefs = NotificationPreferences::defaults_for(user_id, user_type);
            all.push(prefs.clone());
            tracing::info!(user_id = %user_id, user_type = user_type.as_str(), "Default notification preferences created");
            Ok(prefs)
        })
    }

    pub fn update(
        &self,
        user_id: &str,
        update: &PreferencesUpdate,
    ) -> AppResult<NotificationPreferences> {
        if update.is_empty() {
            return Err(AppError::validation("Preference update sets nothing"));
        }

        let _guard = self.ctx.exclusive();
        PREFERENCES.update(&self.ctx, |all| {
            let prefs = all
                .iter_mut()
                .find(|p| p.user_id == user_id)
                .ok_or_else(|| {
                    AppError::new(ErrorCode::PreferencesNotFound).with_detail("user_id", user_id)
                })?;
            prefs.apply(update);
            Ok(prefs.clone())
        })
    }

    /// Returns whether a record was removed
    pub fn delete(&self, user_id: &str) -> AppResult<bool> {
        let _guard = self.ctx.exclusive();
        let mut all = PREFERENCES.load(&self.ctx)?;
        let before = all.len();
        all.retain(|p| p.user_id != user_id);
        if all.len() == before {
            return Ok(false);
        }
        PREFERENCES.save(&self.ctx, &all)?;
        Ok(true)
    }

    /// Eligibility check; users without stored preferences see everything
    pub fn should_show(
        &self,
        user_id: &str,
        category: NotificationCategory,
        channel: Channel,
    ) -> AppResult<bool> {
        Ok(self
            .get(user_id)?
            .is_none_or(|prefs| prefs.permits(category, channel)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KvStore, MemoryStore};
    use crate::sync::ChangeBus;
    use shared::error::ErrorKind;
    use std::sync::Arc;

    fn service() -> PreferenceService {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        PreferenceService::new(StoreContext::new("test", store, ChangeBus::new()))
    }

    #[test]
    fn test_no_preferences_shows_everything() {
        let prefs = service();
        assert!(
            prefs
                .should_show("c-1", NotificationCategory::Promotion, Channel::Email)
                .unwrap()
        );
    }

    #[test]
    fn test_create_default_is_idempotent() {
        let prefs = service();
        let first = prefs.create_default("c-1", UserType::Customer).unwrap();
        prefs
            .update(
                "c-1",
                &PreferencesUpdate {
                    email_enabled: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        let second = prefs.create_default("c-1", UserType::Customer).unwrap();

        assert!(first.email_enabled);
        assert!(!second.email_enabled);
        assert_eq!(prefs.all().unwrap().len(), 1);
    }

    #[test]
    fn test_support_has_no_preferences() {
        let err = service().create_default("s-1", UserType::Support).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    }

    #[test]
    fn test_update_rules() {
        let prefs = service();
        let err = prefs
            .update(
                "r-1",
                &PreferencesUpdate {
                    messages: Some(false),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PreferencesNotFound);

        prefs.create_default("r-1", UserType::Rider).unwrap();
        let err = prefs.update("r-1", &PreferencesUpdate::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);

        let updated = prefs
            .update(
                "r-1",
                &PreferencesUpdate {
                    messages: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!updated.messages);
        assert!(
            !prefs
                .should_show("r-1", NotificationCategory::Message, Channel::InApp)
                .unwrap()
        );
        assert!(
            prefs
                .should_show("r-1", NotificationCategory::OrderUpdate, Channel::InApp)
                .unwrap()
        );
    }

    #[test]
    fn test_delete() {
        let prefs = service();
        prefs.create_default("c-1", UserType::Customer).unwrap();
        assert!(prefs.delete("c-1").unwrap());
        assert!(!prefs.delete("c-1").unwrap());
        assert!(prefs.get("c-1").unwrap().is_none());
    }
}
