use polars::prelude::*;
use rustc_hash::FxHashMap;
use itertools::Itertools;
use log::{debug, info};
use crate::analysis::preprocess::{
    CLUSTER_NUMBER_COL, COEXPRESSION_COL, COMBINED_SCORE_COL, PARTNER_COL, PROTEIN_COL,
};
use crate::analysis::table_filter::{
    column_f64, column_i64, filter_table, required_strings, ColumnFilter,
};
use crate::error::{CodepNetError, Result};

pub type ClusterId = i64;
pub type ClusterMap = FxHashMap<String, ClusterId>;

pub const ROOT_CLUSTER_ID: ClusterId = 0;
pub const CLUSTER_ID_COL: &str = "cluster_id";
const SAME_CLUSTER_COL: &str = "same_cluster";

/// One row of a preprocessed interaction table.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRecord {
    pub protein: String,
    pub partner: String,
    pub coexpression: f64,
    pub combined_score: f64,
    pub cluster_id: Option<ClusterId>,
}

/// Maps every clustered identifier to its cluster and pins `root` to cluster 0.
pub fn build_cluster_map(root: &str, clusters: &DataFrame) -> Result<ClusterMap> {
    let proteins = required_strings(clusters, PROTEIN_COL)?;
    let cluster_numbers = column_i64(clusters, CLUSTER_NUMBER_COL)?;

    let mut cluster_map: ClusterMap = proteins
        .into_iter()
        .zip(cluster_numbers)
        .filter_map(|(protein, cluster)| match cluster {
            Some(cluster) => Some((protein.to_uppercase(), cluster)),
            None => {
                debug!("Skipping {} without a cluster number", protein);
                None
            }
        })
        .collect();

    cluster_map.insert(root.to_uppercase(), ROOT_CLUSTER_ID);
    Ok(cluster_map)
}

fn in_same_cluster(cluster_map: &ClusterMap, left: &str, right: &str) -> bool {
    match (cluster_map.get(left), cluster_map.get(right)) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

/// Restricts `interactions` to pairs of clustered genes that share a cluster.
///
/// Both endpoints must appear in the clusters table and map to the same
/// cluster id in the returned cluster map, which pins `root` to cluster 0.
/// Surviving rows gain a `cluster_id` column.
pub fn get_within_cluster_interactions(
    root: &str,
    clusters: &DataFrame,
    interactions: &DataFrame,
) -> Result<(DataFrame, ClusterMap)> {
    let members: Vec<String> = required_strings(clusters, PROTEIN_COL)?
        .into_iter()
        .unique()
        .collect();

    let member_interactions = filter_table(
        interactions,
        &[
            ColumnFilter::one_of(PROTEIN_COL, members.iter()),
            ColumnFilter::one_of(PARTNER_COL, members.iter()),
        ],
        &[],
    )?
    .into_table();

    let cluster_map = build_cluster_map(root, clusters)?;

    let lefts = required_strings(&member_interactions, PROTEIN_COL)?;
    let rights = required_strings(&member_interactions, PARTNER_COL)?;
    let same_cluster: Vec<bool> = lefts
        .iter()
        .zip(&rights)
        .map(|(left, right)| {
            in_same_cluster(&cluster_map, &left.to_uppercase(), &right.to_uppercase())
        })
        .collect();

    let mut flagged = member_interactions;
    flagged.with_column(Series::new(SAME_CLUSTER_COL.into(), same_cluster))?;
    let mut within = flagged
        .lazy()
        .filter(col(SAME_CLUSTER_COL))
        .collect()?
        .drop(SAME_CLUSTER_COL)?;

    let cluster_ids = required_strings(&within, PROTEIN_COL)?
        .into_iter()
        .map(|gene| {
            let gene = gene.to_uppercase();
            cluster_map
                .get(&gene)
                .copied()
                .ok_or(CodepNetError::MissingCluster(gene))
        })
        .collect::<Result<Vec<ClusterId>>>()?;
    within.with_column(Series::new(CLUSTER_ID_COL.into(), cluster_ids))?;

    info!(
        "{} of {} interactions fall within a single cluster",
        within.height(),
        interactions.height()
    );

    Ok((within, cluster_map))
}

/// Reads a preprocessed interaction table into records. Missing or NaN
/// scores read as 0. `cluster_id` is filled only when the table went
/// through the cluster join.
pub fn interaction_records(interactions: &DataFrame) -> Result<Vec<InteractionRecord>> {
    let proteins = required_strings(interactions, PROTEIN_COL)?;
    let partners = required_strings(interactions, PARTNER_COL)?;
    let coexpression = column_f64(interactions, COEXPRESSION_COL)?;
    let combined_scores = column_f64(interactions, COMBINED_SCORE_COL)?;
    let cluster_ids = match interactions.get_column_index(CLUSTER_ID_COL) {
        Some(_) => column_i64(interactions, CLUSTER_ID_COL)?,
        None => vec![None; interactions.height()],
    };

    let records = proteins
        .into_iter()
        .zip(partners)
        .enumerate()
        .map(|(row, (protein, partner))| {
            if coexpression[row].is_none() || combined_scores[row].is_none() {
                debug!("Missing score for {}-{}, using 0", protein, partner);
            }
            InteractionRecord {
                protein: protein.to_uppercase(),
                partner: partner.to_uppercase(),
                coexpression: coexpression[row].unwrap_or(0.0),
                combined_score: combined_scores[row].unwrap_or(0.0),
                cluster_id: cluster_ids[row],
            }
        })
        .collect();
    Ok(records)
}

/// Distinct cluster ids of a cluster map, ascending.
pub fn cluster_ids(cluster_map: &ClusterMap) -> Vec<ClusterId> {
    cluster_map.values().copied().sorted().dedup().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clusters() -> DataFrame {
        df!(
            "protein" => ["A", "B", "C"],
            "cluster number" => [1i64, 1, 2],
            "gene count" => [8i64, 8, 6]
        )
        .unwrap()
    }

    fn interactions() -> DataFrame {
        df!(
            "protein" => ["A", "A"],
            "n2" => ["B", "C"],
            "coexpression" => [0.5f64, 0.1],
            "combined_score" => [900.0f64, 200.0]
        )
        .unwrap()
    }

    #[test]
    fn test_only_same_cluster_pairs_survive() {
        let (within, cluster_map) =
            get_within_cluster_interactions("R", &clusters(), &interactions()).unwrap();

        let records = interaction_records(&within).unwrap();
        assert_eq!(
            records,
            vec![InteractionRecord {
                protein: "A".to_string(),
                partner: "B".to_string(),
                coexpression: 0.5,
                combined_score: 900.0,
                cluster_id: Some(1),
            }]
        );
        assert_eq!(cluster_map["R"], ROOT_CLUSTER_ID);
        assert!(within.column(SAME_CLUSTER_COL).is_err());

        for record in &records {
            assert_eq!(cluster_map[&record.protein], cluster_map[&record.partner]);
            assert_eq!(Some(cluster_map[&record.protein]), record.cluster_id);
        }
    }

    #[test]
    fn test_root_is_pinned_to_cluster_zero() {
        let clusters = df!(
            "protein" => ["ROOT", "A"],
            "cluster number" => [4i64, 4],
            "gene count" => [9i64, 9]
        )
        .unwrap();
        let interactions = df!(
            "protein" => ["ROOT"],
            "n2" => ["A"],
            "coexpression" => [0.3f64],
            "combined_score" => [500.0f64]
        )
        .unwrap();

        let (within, cluster_map) =
            get_within_cluster_interactions("root", &clusters, &interactions).unwrap();
        assert_eq!(cluster_map["ROOT"], ROOT_CLUSTER_ID);
        assert_eq!(cluster_map["A"], 4);
        assert_eq!(within.height(), 0);
    }

    #[test]
    fn test_unclustered_endpoints_are_dropped() {
        let interactions = df!(
            "protein" => ["A", "A", "Z"],
            "n2" => ["B", "Y", "B"],
            "coexpression" => [0.5f64, 0.2, 0.1],
            "combined_score" => [900.0f64, 300.0, 150.0]
        )
        .unwrap();

        let (within, _) = get_within_cluster_interactions("R", &clusters(), &interactions).unwrap();
        assert_eq!(within.height(), 1);
        assert_eq!(column_i64(&within, CLUSTER_ID_COL).unwrap(), vec![Some(1)]);
    }

    #[test]
    fn test_missing_scores_read_as_zero() {
        let interactions = df!(
            "protein" => ["a", "b"],
            "n2" => ["b", "c"],
            "coexpression" => [None, Some(0.4f64)],
            "combined_score" => [Some(700.0f64), Some(f64::NAN)]
        )
        .unwrap();

        let records = interaction_records(&interactions).unwrap();
        assert_eq!((records[0].coexpression, records[0].combined_score), (0.0, 700.0));
        assert_eq!((records[1].coexpression, records[1].combined_score), (0.4, 0.0));
        assert_eq!(records[0].protein, "A");
        assert_eq!(records[1].cluster_id, None);
    }

    #[test]
    fn test_empty_join_is_not_an_error() {
        let interactions = df!(
            "protein" => ["A"],
            "n2" => ["C"],
            "coexpression" => [0.5f64],
            "combined_score" => [900.0f64]
        )
        .unwrap();

        let (within, cluster_map) =
            get_within_cluster_interactions("R", &clusters(), &interactions).unwrap();
        assert_eq!(within.height(), 0);
        assert!(within.column(CLUSTER_ID_COL).is_ok());
        assert_eq!(cluster_ids(&cluster_map), vec![0, 1, 2]);
    }
}
