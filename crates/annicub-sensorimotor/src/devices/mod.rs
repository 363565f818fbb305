// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Reader and writer modules bridging robot hardware and population codes.

pub mod hardware;
mod joint_reader;
mod joint_writer;
mod robot_part;
pub mod skin_reader;

pub use hardware::{ControlMode, JointActuator, JointEncoders, TactileSource};
pub use joint_reader::JointReader;
pub use joint_writer::{JointTarget, JointWriter, MotionMode, PopulationMotion, WriterSettings};
pub use robot_part::{ArmSide, RobotPart};
pub use skin_reader::{SkinReader, SkinSection};

use crate::error::{SensorimotorError, SensorimotorResult};
use crate::population_coding::QuantityRange;
use annicub_config::AnnIcubConfig;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const ENCODER_POLL_INTERVAL: Duration = Duration::from_millis(1);
const ENCODER_POLL_ATTEMPTS: u32 = 1000;

/// Poll `read` until the driver delivers a frame
///
/// Gives up with [`SensorimotorError::Hardware`] after about one second.
pub(crate) fn poll_frame<T>(
    identifier: &str,
    mut read: impl FnMut() -> SensorimotorResult<Option<T>>,
) -> SensorimotorResult<T> {
    for _ in 0..ENCODER_POLL_ATTEMPTS {
        if let Some(frame) = read()? {
            return Ok(frame);
        }
        std::thread::sleep(ENCODER_POLL_INTERVAL);
    }
    tracing::error!(module = identifier, "no encoder frame available");
    Err(SensorimotorError::Hardware(format!(
        "[{}] no encoder frame after {} attempts",
        identifier, ENCODER_POLL_ATTEMPTS
    )))
}

/// Milliseconds since the Unix epoch
pub(crate) fn timestamp_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Operating range of every joint of `part`
///
/// Limits come from the driver. If the driver cannot report them, the
/// `[joint_limits.<part>]` table of `fallback` is used instead.
pub(crate) fn resolve_joint_ranges<E: JointEncoders + ?Sized>(
    part: RobotPart,
    encoders: &E,
    fallback: Option<&AnnIcubConfig>,
) -> SensorimotorResult<Vec<QuantityRange>> {
    (0..encoders.joint_count())
        .map(|joint| {
            let (min, max) = match encoders.joint_limits(joint) {
                Ok(limits) => limits,
                Err(err) => match fallback.and_then(|config| config.joint_limits_for(part.as_key(), joint)) {
                    Some(limits) => {
                        tracing::warn!(%part, joint, %err, "using configured joint limits");
                        limits
                    }
                    None => return Err(err),
                },
            };
            QuantityRange::new(min, max)
        })
        .collect()
}
