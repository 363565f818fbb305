//! Tests for the joint reader
//!
//! Tests cover:
//! - Layout derivation from driver limits and configured fallback limits
//! - Rejection of invalid configuration
//! - Plain and timestamped reads
//! - Population reads and transport payloads

mod common;

use annicub_config::AnnIcubConfig;
use annicub_sensorimotor::devices::{JointReader, RobotPart};
use annicub_sensorimotor::population_coding::{CodingResolution, PopulationCodec, RangeModel};
use annicub_sensorimotor::transport::{split_populations, JointSelection, ProvidedData};
use annicub_sensorimotor::SensorimotorError;
use common::FakePart;

fn head_reader(part: &FakePart) -> JointReader {
    common::init_test_logging();
    JointReader::new(
        RobotPart::Head,
        1.5,
        CodingResolution::DegreesPerNeuron(1.0),
        Box::new(part.clone()),
    )
    .unwrap()
}

#[cfg(test)]
mod test_construction {
    use super::*;

    #[test]
    fn test_layout_per_joint() {
        let reader = head_reader(&FakePart::head());

        assert_eq!(reader.identifier(), "JointReader: head");
        assert_eq!(reader.joint_count(), 6);
        assert_eq!(reader.neurons_per_joint(), vec![71, 131, 111, 51, 103, 91]);
        assert_eq!(reader.joints_deg_res(), vec![1.0; 6]);
        assert_eq!(reader.range_model(0).unwrap().preferred_values()[0], -40.0);
    }

    #[test]
    fn test_population_size_selector() {
        let part = FakePart::new(&[(0.0, 89.0), (-10.0, 9.0)]);
        let reader = JointReader::new(
            RobotPart::Torso,
            5.0,
            CodingResolution::PopulationSize(10),
            Box::new(part),
        )
        .unwrap();

        assert_eq!(reader.neurons_per_joint(), vec![10, 10]);
        assert_eq!(reader.joints_deg_res(), vec![9.0, 2.0]);
    }

    #[test]
    fn test_invalid_sigma_is_rejected() {
        let result = JointReader::new(
            RobotPart::Head,
            0.0,
            CodingResolution::DegreesPerNeuron(1.0),
            Box::new(FakePart::head()),
        );
        assert!(matches!(result, Err(SensorimotorError::InvalidSigma(_))));
    }

    #[test]
    fn test_equal_limits_are_rejected() {
        let result = JointReader::new(
            RobotPart::Head,
            1.0,
            CodingResolution::DegreesPerNeuron(1.0),
            Box::new(FakePart::new(&[(5.0, 5.0)])),
        );
        assert!(matches!(result, Err(SensorimotorError::InvalidRange { .. })));
    }

    #[test]
    fn test_configured_limits_replace_missing_driver_limits() {
        let part = FakePart::new(&[(0.0, 1.0), (0.0, 1.0)]);
        part.with(|state| state.limits_unavailable = true);

        let mut config = AnnIcubConfig::default();
        config.population.population_size = 0;
        config.population.deg_per_neuron = 2.0;
        let limits = config.joint_limits.entry("torso".to_string()).or_default();
        limits.insert("joint_0_min".to_string(), -20.0);
        limits.insert("joint_0_max".to_string(), 19.0);
        limits.insert("joint_1_min".to_string(), 0.0);
        limits.insert("joint_1_max".to_string(), 9.0);

        let reader = JointReader::from_config(RobotPart::Torso, &config, Box::new(part)).unwrap();
        assert_eq!(reader.neurons_per_joint(), vec![20, 5]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AnnIcubConfig::default();
        config.population.sigma = -1.0;
        let result = JointReader::from_config(RobotPart::Head, &config, Box::new(FakePart::head()));
        assert!(matches!(result, Err(SensorimotorError::InvalidConfiguration(_))));

        let mut config = AnnIcubConfig::default();
        config
            .joint_limits
            .entry("head".to_string())
            .or_default()
            .insert("joint_0_min".to_string(), -40.0);
        let result = JointReader::from_config(RobotPart::Head, &config, Box::new(FakePart::head()));
        assert!(matches!(result, Err(SensorimotorError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_missing_limits_without_config_fail() {
        let part = FakePart::head();
        part.with(|state| state.limits_unavailable = true);
        let result = JointReader::new(
            RobotPart::Head,
            1.0,
            CodingResolution::DegreesPerNeuron(1.0),
            Box::new(part),
        );
        assert!(matches!(result, Err(SensorimotorError::Hardware(_))));
    }
}

#[cfg(test)]
mod test_plain_reads {
    use super::*;

    #[test]
    fn test_read_all_multiple_and_one() {
        let part = FakePart::head();
        part.set_angles(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut reader = head_reader(&part);

        assert_eq!(reader.read_double_all().unwrap(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(reader.read_double_multiple(&[4, 0]).unwrap(), vec![5.0, 1.0]);
        assert_eq!(reader.read_double_one(2).unwrap(), 3.0);
    }

    #[test]
    fn test_timed_reads_prepend_timestamp() {
        let part = FakePart::head();
        part.set_angles(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut reader = head_reader(&part);

        let all = reader.read_double_all_timed().unwrap();
        assert_eq!(all.len(), 7);
        assert!(all[0] > 1.6e12);
        assert_eq!(&all[1..], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let one = reader.read_double_one_timed(5).unwrap();
        assert_eq!(one.len(), 2);
        assert_eq!(one[1], 6.0);

        let multiple = reader.read_double_multiple_timed(&[1, 3]).unwrap();
        assert_eq!(&multiple[1..], &[2.0, 4.0]);
    }

    #[test]
    fn test_waits_for_encoder_frame() {
        let part = FakePart::head();
        part.with(|state| state.missing_frames = 5);
        let mut reader = head_reader(&part);

        assert_eq!(reader.read_double_all().unwrap().len(), 6);
        assert_eq!(part.with(|state| state.missing_frames), 0);
    }

    #[test]
    fn test_joint_out_of_range() {
        let mut reader = head_reader(&FakePart::head());

        assert_eq!(
            reader.read_double_one(6),
            Err(SensorimotorError::JointOutOfRange { joint: 6, joints: 6 })
        );
        assert!(matches!(
            reader.read_pop_multiple(&[0, 9]),
            Err(SensorimotorError::JointOutOfRange { joint: 9, .. })
        ));
    }
}

#[cfg(test)]
mod test_population_reads {
    use super::*;

    #[test]
    fn test_read_pop_matches_codec() {
        let part = FakePart::head();
        part.set_angles(&[-10.0, 0.0, 12.5, -3.0, 40.0, 45.0]);
        let mut reader = head_reader(&part);
        let codec = PopulationCodec::with_sigma(1.5).unwrap();

        let populations = reader.read_pop_all().unwrap();
        assert_eq!(populations.len(), 6);
        for (joint, population) in populations.iter().enumerate() {
            let model = reader.range_model(joint).unwrap();
            assert_eq!(population.len(), model.neuron_count());
            let angle = [-10.0, 0.0, 12.5, -3.0, 40.0, 45.0][joint];
            assert_eq!(population, &codec.encode(angle, model));
        }

        let single = reader.read_pop_one(5).unwrap();
        assert_eq!(single[45], 1.0);
        assert!((codec.decode(&single, reader.range_model(5).unwrap()).unwrap() - 45.0).abs() < 0.1);
    }

    #[test]
    fn test_read_pop_multiple_keeps_selection_order() {
        let part = FakePart::head();
        part.set_angles(&[-10.0, 0.0, 12.5, -3.0, 40.0, 45.0]);
        let mut reader = head_reader(&part);

        let populations = reader.read_pop_multiple(&[5, 0]).unwrap();
        assert_eq!(populations[0].len(), 91);
        assert_eq!(populations[1].len(), 71);
        assert_eq!(populations[1][30], 1.0);
    }

    #[test]
    fn test_provide_encoded_payload_splits_back() {
        let part = FakePart::head();
        part.set_angles(&[-10.0, 0.0, 12.5, -3.0, 40.0, 45.0]);
        let mut reader = head_reader(&part);

        let provided = reader.provide(&JointSelection::Multiple(vec![3, 1]), true).unwrap();
        let (joints, values) = match provided {
            ProvidedData::Multiple { joints, values } => (joints, values),
            other => panic!("unexpected payload {:?}", other),
        };
        assert_eq!(joints, vec![3, 1]);
        assert_eq!(values.len(), 51 + 131);

        let populations = split_populations(&values, &[51, 131]).unwrap();
        assert_eq!(populations[0], reader.read_pop_one(3).unwrap());
        assert_eq!(populations[1], reader.read_pop_one(1).unwrap());
    }

    #[test]
    fn test_provide_plain_values() {
        let part = FakePart::head();
        part.set_angles(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut reader = head_reader(&part);

        assert_eq!(
            reader.provide(&JointSelection::One(2), false).unwrap(),
            ProvidedData::One {
                joint: 2,
                values: vec![3.0]
            }
        );
        assert_eq!(reader.provide(&JointSelection::All, false).unwrap().values().len(), 6);
    }

    #[test]
    fn test_parameters_export() {
        let reader = head_reader(&FakePart::head());
        let parameters = reader.parameters();

        assert_eq!(parameters["type"], "JointReader");
        assert_eq!(parameters["part"], "head");
        assert_eq!(parameters["sigma"], 1.5);
    }
}
