// Copyright 2026 Runlog Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::any::Any;
use std::any::TypeId;
use std::sync::Arc;

/// A tracked object that log files can be kept for.
///
/// The registry uses a subject in exactly two ways: as an identity key for
/// handle caching (compared by `Arc` pointer, never by value), and as the
/// source of a display name. A [`LogHandle`] never mutates its subject.
///
/// The `Any` supertrait is what makes exact-type dispatch work: the registry
/// reads the concrete `TypeId` of a `dyn Subject` to pick a registered
/// handler, and handlers downcast back to the concrete type.
///
/// [`LogHandle`]: crate::LogHandle
pub trait Subject: Any + Send + Sync {
    /// A short display name for this object.
    ///
    /// Generic handles derive their log folder from this string, so two
    /// distinct subjects with the same description share a file set. Give
    /// subjects of the same type distinguishing descriptions (a port number,
    /// a device id) if they coexist in one run.
    fn describe(&self) -> String;
}

/// The `TypeId` of a subject's concrete type.
///
/// Goes through an upcast to `dyn Any` so the id comes from the vtable of
/// the concrete type, never from the `dyn Subject` type itself.
pub(crate) fn concrete_type_id(subject: &dyn Subject) -> TypeId {
    let any: &dyn Any = subject;
    any.type_id()
}

/// Identity key for the handle cache.
///
/// Derived from the `Arc` data pointer. A cached handle holds its subject
/// alive, so an address cannot be recycled while its entry exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SubjectId(usize);

impl SubjectId {
    pub(crate) fn of(subject: &Arc<dyn Subject>) -> Self {
        Self(Arc::as_ptr(subject) as *const () as usize)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::Subject;
    use super::SubjectId;

    struct Motor(u8);

    impl Subject for Motor {
        fn describe(&self) -> String {
            format!("motor-{}", self.0)
        }
    }

    #[test]
    fn test_identity_not_value() {
        let a: Arc<dyn Subject> = Arc::new(Motor(1));
        let b: Arc<dyn Subject> = Arc::new(Motor(1));
        assert_eq!(a.describe(), b.describe());
        assert_ne!(SubjectId::of(&a), SubjectId::of(&b));
        assert_eq!(SubjectId::of(&a), SubjectId::of(&a.clone()));
    }
}
