// 🧮 Calculation Rules - Revenue, expenses, profit, estimated tax
//
//   revenue      = Σ slots  price(slot.service) × #Presente
//   net_profit   = revenue - expenses          (may be negative)
//   estimated tax = revenue × flat rate        (gross, never net)
//
// Shared by the single-day report and the yearly aggregation.

use crate::models::{AttendanceStatus, DailySchedule, Expense, Service, TimeSlot, YearlySummary};
use serde::Serialize;

/// Revenue of one slot; zero when its service no longer resolves
pub fn slot_revenue(slot: &TimeSlot, services: &[Service]) -> f64 {
    match services.iter().find(|s| s.id == slot.service_id) {
        Some(service) => service.price * slot.present_count() as f64,
        None => 0.0,
    }
}

pub fn calculate_total_revenue(schedule: &DailySchedule, services: &[Service]) -> f64 {
    schedule.iter().map(|slot| slot_revenue(slot, services)).sum()
}

pub fn calculate_total_expenses(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

pub fn calculate_net_profit(revenue: f64, expenses: f64) -> f64 {
    revenue - expenses
}

pub fn calculate_estimated_tax(revenue: f64, tax_rate: f64) -> f64 {
    revenue * tax_rate
}

/// Fold already-selected days into a summary
pub fn calculate_yearly_summary<'a, S, E>(
    schedules: S,
    expense_lists: E,
    services: &[Service],
    tax_rate: f64,
) -> YearlySummary
where
    S: IntoIterator<Item = &'a DailySchedule>,
    E: IntoIterator<Item = &'a Vec<Expense>>,
{
    let total_revenue: f64 = schedules
        .into_iter()
        .map(|schedule| calculate_total_revenue(schedule, services))
        .sum();

    let total_expenses: f64 = expense_lists
        .into_iter()
        .map(|expenses| calculate_total_expenses(expenses))
        .sum();

    YearlySummary {
        total_revenue,
        total_expenses,
        net_profit: calculate_net_profit(total_revenue, total_expenses),
        estimated_tax: calculate_estimated_tax(total_revenue, tax_rate),
    }
}

// ============================================================================
// DAILY REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceLine {
    pub time: String,
    pub service_name: String,
    pub student_name: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    pub date: String,
    pub revenue: f64,
    pub expenses: f64,
    pub net_profit: f64,

    /// Every booked student (status other than Vago), in schedule order
    pub attendance: Vec<AttendanceLine>,
}

impl DailyReport {
    pub fn build(
        date: &str,
        schedule: &DailySchedule,
        expenses: &[Expense],
        services: &[Service],
    ) -> Self {
        let revenue = calculate_total_revenue(schedule, services);
        let total_expenses = calculate_total_expenses(expenses);

        let attendance = schedule
            .iter()
            .flat_map(|slot| {
                let service_name = services
                    .iter()
                    .find(|s| s.id == slot.service_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| "N/A".to_string());

                slot.students
                    .iter()
                    .filter(|student| student.status != AttendanceStatus::Vago)
                    .map(move |student| AttendanceLine {
                        time: slot.time.clone(),
                        service_name: service_name.clone(),
                        student_name: student.name.clone(),
                        status: student.status,
                    })
            })
            .collect();

        DailyReport {
            date: date.to_string(),
            revenue,
            expenses: total_expenses,
            net_profit: calculate_net_profit(revenue, total_expenses),
            attendance,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Report for {}: revenue R$ {:.2}, expenses R$ {:.2}, net profit R$ {:.2} ({} attendances)",
            self.date,
            self.revenue,
            self.expenses,
            self.net_profit,
            self.attendance.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Student;

    fn service(id: &str, price: f64) -> Service {
        Service {
            id: id.to_string(),
            name: format!("svc {}", id),
            price,
        }
    }

    fn student(name: &str, status: AttendanceStatus) -> Student {
        let mut s = Student::blank(status);
        s.name = name.to_string();
        s
    }

    fn slot(time: &str, service_id: &str, students: Vec<Student>) -> TimeSlot {
        TimeSlot {
            time: time.to_string(),
            service_id: service_id.to_string(),
            students,
        }
    }

    fn expense(amount: f64) -> Expense {
        Expense {
            id: uuid::Uuid::new_v4().to_string(),
            description: "x".to_string(),
            amount,
            date: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn test_only_presente_earns() {
        let services = vec![service("p", 25.0)];
        let schedule = vec![slot(
            "08:00",
            "p",
            vec![
                student("Ana", AttendanceStatus::Presente),
                student("Bia", AttendanceStatus::Faltou),
            ],
        )];

        assert_eq!(calculate_total_revenue(&schedule, &services), 25.0);
    }

    #[test]
    fn test_unresolved_service_contributes_zero() {
        let services = vec![service("p", 25.0)];
        let schedule = vec![
            slot("08:00", "gone", vec![student("Ana", AttendanceStatus::Presente)]),
            slot("09:00", "p", vec![student("Bia", AttendanceStatus::Presente)]),
        ];

        assert_eq!(calculate_total_revenue(&schedule, &services), 25.0);
    }

    #[test]
    fn test_net_profit_may_be_negative() {
        let expenses = vec![expense(30.0), expense(12.5)];
        let total = calculate_total_expenses(&expenses);

        assert_eq!(total, 42.5);
        assert_eq!(calculate_net_profit(25.0, total), -17.5);
    }

    #[test]
    fn test_tax_from_gross_revenue() {
        let summary = calculate_yearly_summary(
            &vec![vec![slot(
                "08:00",
                "p",
                vec![
                    student("Ana", AttendanceStatus::Presente),
                    student("Bia", AttendanceStatus::Presente),
                ],
            )]],
            &vec![vec![expense(40.0)]],
            &[service("p", 50.0)],
            0.06,
        );

        assert_eq!(summary.total_revenue, 100.0);
        assert_eq!(summary.net_profit, 60.0);
        assert_eq!(summary.estimated_tax, 100.0 * 0.06);
    }

    #[test]
    fn test_daily_report_lists_booked_students() {
        let services = vec![service("p", 25.0)];
        let schedule = vec![
            slot(
                "08:00",
                "p",
                vec![
                    student("Ana", AttendanceStatus::Presente),
                    student("", AttendanceStatus::Vago),
                ],
            ),
            slot("09:00", "gone", vec![student("Caio", AttendanceStatus::Faltou)]),
        ];

        let report = DailyReport::build("2024-03-01", &schedule, &[expense(15.0)], &services);

        assert_eq!(report.revenue, 25.0);
        assert_eq!(report.net_profit, 10.0);
        assert_eq!(report.attendance.len(), 2);
        assert_eq!(report.attendance[0].service_name, "svc p");
        assert_eq!(report.attendance[1].service_name, "N/A");
        assert_eq!(report.attendance[1].status, AttendanceStatus::Faltou);
    }
}
