//! Statement bodies shared by both backends.
//!
//! Every statement uses `$n` placeholders, which the PostgreSQL and SQLite
//! drivers both bind positionally, so one implementation serves either pool.

/// Implement `CredentialStore`, `ClientSecretStore` and `Storage` for a store
/// type holding a `pool: Pool<$db>` field, using `$ddl` as its schema.
macro_rules! impl_storage {
    ($store:ty, $db:ty, $ddl:expr) => {
        impl $store {
            async fn insert_linked_account(
                tx: &mut ::sqlx::Transaction<'_, $db>,
                account: &$crate::db::NewLinkedAccount,
            ) -> Result<$crate::db::UserId, $crate::error::MarathonError> {
                let user_id: $crate::db::UserId =
                    ::sqlx::query_scalar(r#"INSERT INTO "user" DEFAULT VALUES RETURNING id"#)
                        .fetch_one(&mut **tx)
                        .await?;

                ::sqlx::query(
                    r#"INSERT INTO credentials (user_id, platform_name, platform_id, connection_string)
                       VALUES ($1, $2, $3, $4)"#,
                )
                .bind(user_id)
                .bind(account.platform_name.as_str())
                .bind(account.platform_user_id.as_str())
                .bind(account.connection_string.as_str())
                .execute(&mut **tx)
                .await
                .map_err(|e| {
                    $crate::db::linked_account_insert_error(
                        e,
                        user_id,
                        &account.platform_name,
                        &account.platform_user_id,
                    )
                })?;

                Self::insert_membership(tx, user_id, account.client_id).await?;
                Ok(user_id)
            }

            async fn insert_membership(
                tx: &mut ::sqlx::Transaction<'_, $db>,
                user_id: $crate::db::UserId,
                client_id: $crate::db::ClientId,
            ) -> Result<(), $crate::error::MarathonError> {
                ::sqlx::query("INSERT INTO userbase (user_id, client_id) VALUES ($1, $2)")
                    .bind(user_id)
                    .bind(client_id)
                    .execute(&mut **tx)
                    .await
                    .map_err(|e| $crate::db::membership_insert_error(e, client_id))?;
                Ok(())
            }

            async fn refresh_and_join(
                tx: &mut ::sqlx::Transaction<'_, $db>,
                user_id: $crate::db::UserId,
                client_id: $crate::db::ClientId,
                platform_name: &str,
                connection_string: &$crate::types::ConnectionString,
            ) -> Result<(), $crate::error::MarathonError> {
                let updated = ::sqlx::query(
                    "UPDATE credentials SET connection_string = $1 WHERE user_id = $2 AND platform_name = $3",
                )
                .bind(connection_string.as_str())
                .bind(user_id)
                .bind(platform_name)
                .execute(&mut **tx)
                .await?;
                if updated.rows_affected() == 0 {
                    return Err($crate::error::MarathonError::not_found(
                        "linked account",
                        $crate::db::linked_account_key(user_id, platform_name),
                    ));
                }

                Self::insert_membership(tx, user_id, client_id).await
            }
        }

        #[::async_trait::async_trait]
        impl $crate::db::CredentialStore for $store {
            async fn create_linked_account(
                &self,
                account: &$crate::db::NewLinkedAccount,
            ) -> Result<$crate::db::UserId, $crate::error::MarathonError> {
                account.validate()?;

                let mut tx = self.pool.begin().await?;
                match Self::insert_linked_account(&mut tx, account).await {
                    Ok(user_id) => {
                        tx.commit().await?;
                        ::tracing::info!(
                            user_id,
                            client_id = account.client_id,
                            platform = %account.platform_name,
                            "linked account created"
                        );
                        Ok(user_id)
                    }
                    Err(e) => {
                        if let Err(rb) = tx.rollback().await {
                            ::tracing::warn!(error = %rb, "rollback of linked account insert failed");
                        }
                        ::tracing::debug!(
                            platform = %account.platform_name,
                            error = %e,
                            "linked account insert rolled back"
                        );
                        Err(e)
                    }
                }
            }

            async fn add_linked_account(
                &self,
                user_id: $crate::db::UserId,
                platform_name: &str,
                platform_user_id: &str,
                connection_string: &$crate::types::ConnectionString,
            ) -> Result<(), $crate::error::MarathonError> {
                $crate::db::models::validate_platform_account(platform_name, platform_user_id)?;

                ::sqlx::query(
                    r#"INSERT INTO credentials (user_id, platform_name, platform_id, connection_string)
                       VALUES ($1, $2, $3, $4)"#,
                )
                .bind(user_id)
                .bind(platform_name)
                .bind(platform_user_id)
                .bind(connection_string.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    $crate::db::linked_account_insert_error(e, user_id, platform_name, platform_user_id)
                })?;

                ::tracing::info!(user_id, platform = %platform_name, "platform account linked to existing user");
                Ok(())
            }

            async fn relink(
                &self,
                user_id: $crate::db::UserId,
                client_id: $crate::db::ClientId,
                platform_name: &str,
                connection_string: &$crate::types::ConnectionString,
            ) -> Result<(), $crate::error::MarathonError> {
                let mut tx = self.pool.begin().await?;
                match Self::refresh_and_join(&mut tx, user_id, client_id, platform_name, connection_string)
                    .await
                {
                    Ok(()) => {
                        tx.commit().await?;
                        ::tracing::info!(user_id, client_id, platform = %platform_name, "linked account re-authorized");
                        Ok(())
                    }
                    Err(e) => {
                        if let Err(rb) = tx.rollback().await {
                            ::tracing::warn!(error = %rb, "rollback of relink failed");
                        }
                        Err(e)
                    }
                }
            }

            async fn lookup_user_by_platform_account(
                &self,
                platform_name: &str,
                platform_user_id: &str,
            ) -> Result<Option<$crate::db::UserId>, $crate::error::MarathonError> {
                let user_id: Option<$crate::db::UserId> = ::sqlx::query_scalar(
                    "SELECT user_id FROM credentials WHERE platform_name = $1 AND platform_id = $2",
                )
                .bind(platform_name)
                .bind(platform_user_id)
                .fetch_optional(&self.pool)
                .await?;
                Ok(user_id)
            }

            async fn get_linked_account(
                &self,
                user_id: $crate::db::UserId,
                platform_name: &str,
            ) -> Result<$crate::db::DbLinkedAccount, $crate::error::MarathonError> {
                ::sqlx::query_as::<_, $crate::db::DbLinkedAccount>(
                    r#"SELECT id, user_id, platform_name, platform_id, connection_string
                       FROM credentials WHERE user_id = $1 AND platform_name = $2"#,
                )
                .bind(user_id)
                .bind(platform_name)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    $crate::error::MarathonError::not_found(
                        "linked account",
                        $crate::db::linked_account_key(user_id, platform_name),
                    )
                })
            }

            async fn list_platform_names(
                &self,
                user_id: $crate::db::UserId,
            ) -> Result<Vec<String>, $crate::error::MarathonError> {
                let names: Vec<String> =
                    ::sqlx::query_scalar("SELECT platform_name FROM credentials WHERE user_id = $1")
                        .bind(user_id)
                        .fetch_all(&self.pool)
                        .await?;
                Ok(names)
            }

            async fn update_connection_string(
                &self,
                user_id: $crate::db::UserId,
                platform_name: &str,
                connection_string: &$crate::types::ConnectionString,
            ) -> Result<u64, $crate::error::MarathonError> {
                let result = ::sqlx::query(
                    "UPDATE credentials SET connection_string = $1 WHERE user_id = $2 AND platform_name = $3",
                )
                .bind(connection_string.as_str())
                .bind(user_id)
                .bind(platform_name)
                .execute(&self.pool)
                .await?;
                ::tracing::debug!(
                    user_id,
                    platform = %platform_name,
                    rows = result.rows_affected(),
                    "connection string updated"
                );
                Ok(result.rows_affected())
            }
        }

        #[::async_trait::async_trait]
        impl $crate::db::ClientSecretStore for $store {
            async fn set_secret(
                &self,
                client_id: $crate::db::ClientId,
                secret: &[u8],
            ) -> Result<u64, $crate::error::MarathonError> {
                let result = ::sqlx::query("UPDATE client SET secret = $1 WHERE id = $2")
                    .bind(secret)
                    .bind(client_id)
                    .execute(&self.pool)
                    .await?;
                ::tracing::info!(client_id, rows = result.rows_affected(), "client secret set");
                Ok(result.rows_affected())
            }

            async fn get_secret(
                &self,
                client_id: $crate::db::ClientId,
            ) -> Result<Vec<u8>, $crate::error::MarathonError> {
                let secret: Option<Option<Vec<u8>>> =
                    ::sqlx::query_scalar("SELECT secret FROM client WHERE id = $1")
                        .bind(client_id)
                        .fetch_optional(&self.pool)
                        .await?;
                match secret {
                    Some(Some(secret)) => Ok(secret),
                    Some(None) => Err($crate::error::MarathonError::not_found("client secret", client_id)),
                    None => Err($crate::error::MarathonError::not_found("client", client_id)),
                }
            }
        }

        #[::async_trait::async_trait]
        impl $crate::db::Storage for $store {
            async fn init_schema(&self) -> Result<(), $crate::error::MarathonError> {
                for stmt in $crate::db::schema::statements($ddl) {
                    ::sqlx::query(stmt).execute(&self.pool).await?;
                }
                Ok(())
            }

            async fn close(&self) {
                self.pool.close().await;
            }
        }
    };
}

pub(crate) use impl_storage;
