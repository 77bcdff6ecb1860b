
/// Declares a `u32` identifier newtype usable as a record id.
/// Example: `impl_record_id!(PersonId);`
#[macro_export]
macro_rules! impl_record_id {
    ($New:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            $crate::serde::Serialize, $crate::serde::Deserialize, $crate::utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $New(pub u32);

        impl $crate::record::RecordId for $New {
            #[inline]
            fn from_raw(raw: u32) -> Self {
                $New(raw)
            }
            #[inline]
            fn raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $New {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $New {
            fn from(raw: u32) -> Self {
                $New(raw)
            }
        }
    };
}
