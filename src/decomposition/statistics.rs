use crate::config::MeanScope;
use crate::dataset::Dataset;
use crate::*;

use super::Error;

/// Elementwise mean of the selected image vectors, truncated to whole intensities.
pub fn mean_face(dataset: &Dataset, scope: MeanScope) -> Result<Array1<f64>, Error> {
    let ids: Vec<usize> = match scope {
        MeanScope::AllEntries => (0..dataset.len()).collect(),
        MeanScope::TrainingOnly => dataset.training_ids().to_vec(),
    };
    if ids.is_empty() {
        return Err(match scope {
            MeanScope::AllEntries => Error::EmptyDataset,
            MeanScope::TrainingOnly => Error::EmptyTrainingSet,
        });
    }
    let mut sum = Array1::<f64>::zeros(dataset.pixel_count());
    for &id in &ids {
        sum += &dataset.vector(id);
    }
    let count = ids.len() as f64;
    Ok(sum.mapv_into(|total| (total / count).trunc()))
}

/// Real-valued mean of each class's training members, indexed by class id.
/// Classes with no training member have no mean.
pub fn class_means(dataset: &Dataset) -> Vec<Option<Array1<f64>>> {
    dataset
        .class_groups()
        .iter()
        .map(|group| {
            let members = group
                .iter()
                .filter(|&&id| dataset.partition(id).is_training())
                .collect::<Vec<_>>();
            if members.is_empty() {
                return None;
            }
            let mut sum = Array1::<f64>::zeros(dataset.pixel_count());
            for &&id in &members {
                sum += &dataset.vector(id);
            }
            Some(sum / members.len() as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Partition;
    use image::Luma;
    use ndarray::array;

    fn dataset() -> Dataset {
        let mut dataset = Dataset::new(None);
        let entries = [
            ([1, 2], 1, Partition::Training),
            ([2, 4], 1, Partition::Training),
            ([10, 10], 2, Partition::Training),
            ([100, 0], 1, Partition::Test),
        ];
        for (pixels, label, partition) in entries {
            let gray = GrayImage::from_raw(2, 1, pixels.to_vec()).unwrap();
            dataset.push_gray(gray, label, partition).unwrap();
        }
        dataset
    }

    #[test]
    fn mean_is_truncated_and_covers_every_entry() {
        let mean = mean_face(&dataset(), MeanScope::AllEntries).unwrap();
        // (1 + 2 + 10 + 100) / 4 = 28.25, (2 + 4 + 10 + 0) / 4 = 4
        assert_eq!(mean, array![28.0, 4.0]);
    }

    #[test]
    fn training_only_mean() {
        let mean = mean_face(&dataset(), MeanScope::TrainingOnly).unwrap();
        // 13 / 3, 16 / 3
        assert_eq!(mean, array![4.0, 5.0]);
    }

    #[test]
    fn empty_dataset_has_no_mean() {
        let empty = Dataset::new(None);
        assert!(matches!(
            mean_face(&empty, MeanScope::AllEntries),
            Err(Error::EmptyDataset)
        ));
        let mut test_only = Dataset::new(None);
        test_only
            .push_gray(GrayImage::from_pixel(1, 1, Luma([3])), 1, Partition::Test)
            .unwrap();
        assert!(matches!(
            mean_face(&test_only, MeanScope::TrainingOnly),
            Err(Error::EmptyTrainingSet)
        ));
    }

    #[test]
    fn class_means_use_training_members() {
        let means = class_means(&dataset());
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].as_ref().unwrap(), &array![1.5, 3.0]);
        assert_eq!(means[1].as_ref().unwrap(), &array![10.0, 10.0]);
    }
}
