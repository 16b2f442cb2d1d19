//! Occupancy and usage statistics derived from record snapshots

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{bed::WardType, Bed, Equipment};

/// Bed counts for a ward partition
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WardStats {
    pub total_beds: i64,
    pub occupied_beds: i64,
    pub available_beds: i64,
    pub maintenance_beds: i64,
    pub occupancy_rate: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct WardBreakdown {
    pub general: WardStats,
    pub icu: WardStats,
}

/// Bed statistics shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BedStats {
    pub total_beds: i64,
    pub occupied_beds: i64,
    pub available_beds: i64,
    pub maintenance_beds: i64,
    pub occupancy_rate: i64,
    pub available_rate: i64,
    pub maintenance_rate: i64,
    pub by_ward_type: WardBreakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentStats {
    pub total_equipment: i64,
    pub in_use_equipment: i64,
    pub available_equipment: i64,
    pub usage_rate: i64,
}

/// Percentage of `part` in `total`, rounded; 0 for an empty total
pub fn rate(part: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    (part as f64 * 100.0 / total as f64).round() as i64
}

fn ward_stats<'a>(beds: impl Iterator<Item = &'a Bed>) -> WardStats {
    let mut stats = WardStats::default();
    for bed in beds {
        stats.total_beds += 1;
        if bed.is_occupied {
            stats.occupied_beds += 1;
        } else if bed.is_under_maintenance {
            stats.maintenance_beds += 1;
        }
    }
    stats.available_beds = stats.total_beds - stats.occupied_beds - stats.maintenance_beds;
    stats.occupancy_rate = rate(stats.occupied_beds, stats.total_beds);
    stats
}

pub fn bed_stats(beds: &[Bed]) -> BedStats {
    let all = ward_stats(beds.iter());
    BedStats {
        total_beds: all.total_beds,
        occupied_beds: all.occupied_beds,
        available_beds: all.available_beds,
        maintenance_beds: all.maintenance_beds,
        occupancy_rate: all.occupancy_rate,
        available_rate: rate(all.available_beds, all.total_beds),
        maintenance_rate: rate(all.maintenance_beds, all.total_beds),
        by_ward_type: WardBreakdown {
            general: ward_stats(beds.iter().filter(|b| b.ward_type == WardType::General)),
            icu: ward_stats(beds.iter().filter(|b| b.ward_type == WardType::Icu)),
        },
    }
}

pub fn equipment_stats(equipment: &[Equipment]) -> EquipmentStats {
    let total = equipment.len() as i64;
    let in_use = equipment.iter().filter(|e| e.is_in_use).count() as i64;
    EquipmentStats {
        total_equipment: total,
        in_use_equipment: in_use,
        available_equipment: total - in_use,
        usage_rate: rate(in_use, total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{bed::sample_bed, equipment::sample_equipment};

    #[test]
    fn empty_snapshots_have_zero_rates() {
        let stats = bed_stats(&[]);
        assert_eq!(stats.occupancy_rate, 0);
        assert_eq!(stats.available_rate, 0);
        assert_eq!(equipment_stats(&[]).usage_rate, 0);
    }

    #[test]
    fn counts_and_rates() {
        let mut beds: Vec<Bed> = (1..=6).map(sample_bed).collect();
        beds[0].is_occupied = true;
        beds[0].patient_name = Some("Alice".into());
        beds[1].is_occupied = true;
        beds[1].patient_name = Some("Bob".into());
        beds[2].is_under_maintenance = true;
        beds[5].ward_type = WardType::Icu;
        beds[5].is_occupied = true;
        beds[5].patient_name = Some("Carol".into());

        let stats = bed_stats(&beds);
        assert_eq!(stats.total_beds, 6);
        assert_eq!(stats.occupied_beds, 3);
        assert_eq!(stats.maintenance_beds, 1);
        assert_eq!(stats.available_beds, 2);
        assert_eq!(stats.occupancy_rate, 50);
        assert_eq!(stats.available_rate, 33);
        assert_eq!(stats.maintenance_rate, 17);

        assert_eq!(stats.by_ward_type.general.total_beds, 5);
        assert_eq!(stats.by_ward_type.general.occupied_beds, 2);
        assert_eq!(stats.by_ward_type.icu.total_beds, 1);
        assert_eq!(stats.by_ward_type.icu.occupancy_rate, 100);
    }

    #[test]
    fn equipment_usage() {
        let mut items: Vec<Equipment> = (1..=3).map(sample_equipment).collect();
        items[1].is_in_use = true;
        let stats = equipment_stats(&items);
        assert_eq!(stats.in_use_equipment, 1);
        assert_eq!(stats.available_equipment, 2);
        assert_eq!(stats.usage_rate, 33);
    }

    #[test]
    fn rates_round_half_up() {
        assert_eq!(rate(1, 8), 13);
        assert_eq!(rate(2, 3), 67);
    }

    #[test]
    fn serialized_with_dashboard_names() {
        let json = serde_json::to_value(bed_stats(&[])).unwrap();
        assert!(json.get("occupancyRate").is_some());
        assert!(json["byWardType"]["icu"].get("totalBeds").is_some());
    }
}
