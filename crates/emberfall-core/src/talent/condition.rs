//! Talent condition evaluation against a captured hit.

use crate::damage::capture::{AttributeCapture, CaptureDefinitions, CombatantSnapshot};

use super::tree::{ConditionKind, TalentCondition};

/// Everything a condition may look at.
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    /// Snapshots of both participants.
    pub capture: &'a AttributeCapture,
    /// Attributes that may be read.
    pub definitions: &'a CaptureDefinitions,
}

impl TalentCondition {
    /// Evaluates the condition for one hit.
    ///
    /// `Player*` kinds look at the attacker and `Target*` kinds at the
    /// receiver. Threshold kinds only fire for capturable attributes; in
    /// percent mode they also need a max attribute with a positive value.
    /// `TargetReceiveTag` is never satisfied here; it fires from debuff
    /// application instead.
    #[must_use]
    pub fn is_satisfied(&self, ctx: &ConditionContext<'_>) -> bool {
        let source = &ctx.capture.source;
        let target = &ctx.capture.target;
        match self.kind {
            ConditionKind::None => true,
            ConditionKind::PlayerAttributeAbove => self.attribute_check(source, ctx, true),
            ConditionKind::PlayerAttributeBelow => self.attribute_check(source, ctx, false),
            ConditionKind::TargetAttributeAbove => self.attribute_check(target, ctx, true),
            ConditionKind::TargetAttributeBelow => self.attribute_check(target, ctx, false),
            ConditionKind::PlayerHasTag => self.has_tag(source),
            ConditionKind::PlayerDontHaveTag => self.lacks_tag(source),
            ConditionKind::TargetHasTag => self.has_tag(target),
            ConditionKind::TargetDontHaveTag => self.lacks_tag(target),
            ConditionKind::TargetReceiveTag => false,
        }
    }

    fn attribute_check(
        &self,
        side: &CombatantSnapshot,
        ctx: &ConditionContext<'_>,
        above: bool,
    ) -> bool {
        let Some(attribute) = &self.attribute else {
            return false;
        };
        if !ctx.definitions.contains(attribute) {
            return false;
        }
        let mut value = side.attributes.value(attribute);
        if self.percent_of_max {
            let Some(max_attribute) = ctx.definitions.max_for(attribute) else {
                return false;
            };
            let max = side.attributes.value(max_attribute);
            if max <= 0.0 {
                return false;
            }
            value = value / max * 100.0;
        }
        if above {
            value > self.threshold
        } else {
            value < self.threshold
        }
    }

    fn has_tag(&self, side: &CombatantSnapshot) -> bool {
        self.tag.as_ref().is_some_and(|tag| side.tags.has_tag(tag))
    }

    fn lacks_tag(&self, side: &CombatantSnapshot) -> bool {
        self.tag.as_ref().is_some_and(|tag| !side.tags.has_tag(tag))
    }
}
