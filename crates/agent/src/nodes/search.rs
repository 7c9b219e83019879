use metrics::counter;

use sales_agent_config::constants::ranker::MAX_RECOMMENDATIONS;
use sales_agent_core::{ConversationSession, Node, ShownVehicle, VehicleRecommendation};

use super::{NodeContext, Transition};

pub(crate) fn shown_vehicle(rec: &VehicleRecommendation) -> ShownVehicle {
    ShownVehicle {
        vehicle_id: rec.vehicle_id.clone(),
        brand: rec.vehicle.make.clone(),
        model: rec.vehicle.model.clone(),
        year: rec.vehicle.year,
        price: rec.vehicle.price,
    }
}

/// Retrieval errors never leave this node; they become an empty list
pub(crate) async fn handle(session: &mut ConversationSession, ctx: &NodeContext<'_>) -> Transition {
    match ctx.ranker.recommend(&session.profile, MAX_RECOMMENDATIONS).await {
        Ok(mut recommendations) => {
            recommendations.truncate(MAX_RECOMMENDATIONS);
            tracing::info!(
                session_id = %session.session_id,
                results = recommendations.len(),
                "Search completed"
            );
            if recommendations.is_empty() {
                session.metadata.add_flag("no_results");
            }
            session.profile.last_shown = recommendations.iter().map(shown_vehicle).collect();
            session.profile.recommendation_shown = !recommendations.is_empty();
            session.recommendations = recommendations;
        }
        Err(e) => {
            tracing::warn!(session_id = %session.session_id, error = %e, "Search failed");
            counter!("sales_agent_search_errors_total").increment(1);
            session.metadata.add_flag("search_error");
            session.metadata.error_count += 1;
            session.profile.last_shown.clear();
            session.recommendations.clear();
        }
    }

    Transition::cascade(Node::Recommendation)
}
