//! Two mutually exclusive typed branches.
//!
//! Unmarshalling attempts the left branch first; when the left attempt
//! records validation errors those are rolled back and the right branch is
//! tried. When both fail, a single combined error referencing both branches
//! is reported. Used for `type` (string or array of strings),
//! `exclusiveMaximum` (bool or number), `additionalProperties` (schema or
//! bool).

use crate::error::Error;
use crate::marshal::{CoreValue, Unmarshaled, UnmarshalCtx};
use crate::node::NodeRef;
use crate::validation::{Rule, ValidationError};

/// A value that is exactly one of `L` or `R`.
#[derive(Clone, Debug, PartialEq)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

impl<L: Default, R> Default for Either<L, R> {
    fn default() -> Self {
        Either::Left(L::default())
    }
}

impl<L, R> Either<L, R> {
    pub fn is_left(&self) -> bool {
        matches!(self, Either::Left(_))
    }

    pub fn is_right(&self) -> bool {
        matches!(self, Either::Right(_))
    }

    pub fn left(&self) -> Option<&L> {
        match self {
            Either::Left(l) => Some(l),
            Either::Right(_) => None,
        }
    }

    pub fn right(&self) -> Option<&R> {
        match self {
            Either::Left(_) => None,
            Either::Right(r) => Some(r),
        }
    }
}

impl<L, R> CoreValue for Either<L, R>
where
    L: CoreValue + Default,
    R: CoreValue + Default,
{
    fn unmarshal(
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error> {
        // Attempt L against a scratch error sink so a failed attempt leaves
        // no trace.
        let mut left_errors = Vec::new();
        let left = {
            let mut scratch = UnmarshalCtx {
                errors: &mut left_errors,
                config: ctx.config,
            };
            L::unmarshal(node, label, &mut scratch)?
        };
        if left.ok && left_errors.is_empty() {
            return Ok(Unmarshaled::clean(Either::Left(left.value)));
        }

        let mut right_errors = Vec::new();
        let right = {
            let mut scratch = UnmarshalCtx {
                errors: &mut right_errors,
                config: ctx.config,
            };
            R::unmarshal(node, label, &mut scratch)?
        };
        if right.ok && right_errors.is_empty() {
            return Ok(Unmarshaled::clean(Either::Right(right.value)));
        }

        let combined = format!(
            "{label} failed to validate either {} or {}: [{}] or [{}]",
            std::any::type_name::<L>().rsplit("::").next().unwrap_or("left"),
            std::any::type_name::<R>().rsplit("::").next().unwrap_or("right"),
            join_messages(&left_errors),
            join_messages(&right_errors),
        );
        ctx.errors
            .push(ValidationError::new(Rule::TypeMismatch, combined, Some(node)));
        Ok(Unmarshaled::dirty(Either::Left(left.value)))
    }

    fn build_node(&self) -> Result<NodeRef, Error> {
        match self {
            Either::Left(l) => l.build_node(),
            Either::Right(r) => r.build_node(),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
