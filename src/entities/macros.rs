//! Macros for reducing boilerplate when defining metadata rows
//!
//! Every metadata kind shares the same skeleton: an `ID`, its required
//! foreign keys, an optional `NAME`, kind-specific attribute columns, the
//! `DELETED` flag and timestamps. `impl_meta_entity!` generates the struct,
//! the [`Entity`](crate::core::entity::Entity) implementation and the
//! conversions to and from [`Record`](crate::entities::Record).

/// Define a metadata row with automatic trait implementations
///
/// # Example
///
/// ```rust,ignore
/// impl_meta_entity!(
///     ObjectField,
///     ObjectField,
///     foreign_keys: { object_id: "OBJECT_ID" => ObjectFields },
///     columns: {
///         label: "LABEL",
///         field_type: "TYPE",
///     }
/// );
/// ```
///
/// Foreign keys are required `String`s; columns are nullable `Option<String>`,
/// mirroring the storage schema.
#[macro_export]
macro_rules! impl_meta_entity {
    (
        $type:ident,
        $kind:ident,
        foreign_keys: { $( $fk:ident : $fk_col:literal => $relation:ident ),* $(,)? },
        columns: { $( $column:ident : $col_name:literal ),* $(,)? }
    ) => {
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            /// Unique identifier for this row
            #[serde(rename = "ID")]
            pub id: String,

            $(
                #[serde(rename = $fk_col)]
                pub $fk: String,
            )*

            /// Human-readable name
            #[serde(rename = "NAME", default)]
            pub name: Option<String>,

            $(
                #[serde(rename = $col_name, default)]
                pub $column: Option<String>,
            )*

            /// Soft-deletion flag
            #[serde(rename = "DELETED", default)]
            pub deleted: $crate::core::entity::DeletionFlag,

            /// Root of the soft delete that flipped this row
            #[serde(rename = "DELETED_BY", default, skip_serializing_if = "Option::is_none")]
            pub deleted_by: Option<String>,

            /// When this row was created
            #[serde(rename = "CREATED_AT")]
            pub created_at: ::chrono::DateTime<::chrono::Utc>,

            /// When this row was last modified
            #[serde(rename = "UPDATED_AT")]
            pub updated_at: ::chrono::DateTime<::chrono::Utc>,
        }

        impl $crate::core::entity::Entity for $type {
            const KIND: $crate::core::entity::EntityKind =
                $crate::core::entity::EntityKind::$kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn name(&self) -> Option<&str> {
                self.name.as_deref()
            }

            fn flag(&self) -> $crate::core::entity::DeletionFlag {
                self.deleted
            }

            fn set_flag(&mut self, flag: $crate::core::entity::DeletionFlag) {
                self.deleted = flag;
            }

            fn deletion_cause(&self) -> Option<&str> {
                self.deleted_by.as_deref()
            }

            fn set_deletion_cause(&mut self, cause: Option<String>) {
                self.deleted_by = cause;
            }

            fn touch(&mut self) {
                self.updated_at = ::chrono::Utc::now();
            }

            #[allow(unused_variables)]
            fn parent_id(&self, relation: $crate::core::entity::Relation) -> Option<&str> {
                match relation {
                    $( $crate::core::entity::Relation::$relation => Some(&self.$fk), )*
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }

            fn into_record(self) -> $crate::entities::Record {
                $crate::entities::Record::$kind(self)
            }

            fn from_record(record: $crate::entities::Record) -> Option<Self> {
                match record {
                    $crate::entities::Record::$kind(row) => Some(row),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }
        }

        impl From<$type> for $crate::entities::Record {
            fn from(row: $type) -> Self {
                $crate::entities::Record::$kind(row)
            }
        }

        impl $type {
            /// Create an active row with a fresh id
            #[allow(clippy::too_many_arguments)]
            pub fn new(
                $( $fk: impl Into<String>, )*
                name: Option<String>,
                $( $column: Option<String>, )*
            ) -> Self {
                let now = ::chrono::Utc::now();
                Self {
                    id: $crate::core::entity::new_id(),
                    $( $fk: $fk.into(), )*
                    name,
                    $( $column, )*
                    deleted: $crate::core::entity::DeletionFlag::Active,
                    deleted_by: None,
                    created_at: now,
                    updated_at: now,
                }
            }
        }
    };
}
