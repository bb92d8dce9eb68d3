//! Plain-text rendering of the views.

use api_types::{expense::Expense, production::Production, sale::Sale};
use client::views::{DashboardView, Notice, NoticeKind, ReportView};
use engine::{
    Money, SummaryStats, format_currency, format_naive_date,
    format::{format_bucket_label, format_liters},
};

pub fn notice(notice: Option<&Notice>) {
    let Some(notice) = notice else {
        return;
    };
    match notice.kind {
        NoticeKind::Success => println!("{}: {}", notice.title, notice.message),
        NoticeKind::Error => eprintln!("{}: {}", notice.title, notice.message),
    }
}

pub trait Row {
    fn row(&self) -> String;
}

impl Row for Production {
    fn row(&self) -> String {
        format!(
            "{}  {}  {:>12}  {:>4} vacas  {}  {}",
            self.id,
            format_naive_date(self.date),
            format_liters(self.quantity_liters),
            self.cow_count,
            self.quality.as_str(),
            self.notes.as_deref().unwrap_or("-"),
        )
    }
}

impl Row for Sale {
    fn row(&self) -> String {
        format!(
            "{}  {}  {:>12}  {:>12}/L  {:>14}  {}",
            self.id,
            format_naive_date(self.date),
            format_liters(self.quantity_liters),
            format_currency(Money::new(self.price_per_liter_cents)),
            format_currency(Money::new(self.total_amount_cents)),
            self.buyer,
        )
    }
}

impl Row for Expense {
    fn row(&self) -> String {
        format!(
            "{}  {}  {:>14}  {:<14}  {}",
            self.id,
            format_naive_date(self.date),
            format_currency(Money::new(self.amount_cents)),
            self.category.label(),
            self.description,
        )
    }
}

pub fn records<R: Row>(title: &str, records: &[R]) {
    println!("{title} ({})", records.len());
    if records.is_empty() {
        println!("  nenhum registro encontrado");
    }
    for record in records {
        println!("  {}", record.row());
    }
}

fn summary(stats: &SummaryStats) {
    println!("  Produção total:        {}", format_liters(stats.total_production_liters));
    println!(
        "  Média diária:          {}",
        format_liters(stats.average_daily_production_liters)
    );
    println!("  Litros vendidos:       {}", format_liters(stats.total_sold_liters));
    println!("  Receita:               {}", format_currency(stats.total_revenue));
    println!("  Despesas:              {}", format_currency(stats.total_expenses));
    println!("  Lucro líquido:         {}", format_currency(stats.net_profit));
}

pub fn dashboard(view: &DashboardView) {
    if let Some(window) = view.window {
        println!(
            "Painel {} a {}",
            format_naive_date(window.start()),
            format_naive_date(window.end())
        );
    }
    summary(&view.summary);

    println!("Produção diária");
    for point in &view.daily_production {
        println!("  {}  {}", format_bucket_label(&point.label), format_liters(point.value));
    }
    println!("Vendas x despesas");
    for point in &view.daily_revenue_vs_expenses {
        println!(
            "  {}  {:>14}  {:>14}",
            format_bucket_label(&point.label),
            format_currency(point.revenue),
            format_currency(point.expenses)
        );
    }
}

pub fn report(view: &ReportView) {
    println!("Relatório ({})", view.period.label());
    if let Some(window) = view.window {
        println!(
            "  {} a {}",
            format_naive_date(window.start()),
            format_naive_date(window.end())
        );
    }
    summary(&view.summary);

    println!("Produção mensal");
    for point in &view.monthly_production {
        println!("  {}  {}", format_bucket_label(&point.label), format_liters(point.value));
    }
    println!("Produção x vendas");
    for point in &view.production_vs_sales {
        println!(
            "  {}  {:>12}  {:>12}",
            format_bucket_label(&point.label),
            format_liters(point.produced_liters),
            format_liters(point.sold_liters)
        );
    }
    println!("Despesas por categoria");
    for point in &view.expenses_by_category {
        println!("  {:<14}  {}", point.label, format_currency(point.value));
    }
    println!("Receitas x despesas");
    for point in &view.monthly_revenue_vs_expenses {
        println!(
            "  {}  {:>14}  {:>14}",
            format_bucket_label(&point.label),
            format_currency(point.revenue),
            format_currency(point.expenses)
        );
    }
}
