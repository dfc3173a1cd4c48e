//! ABI fragments for the contracts the buy flow interacts with directly: the
//! ERC-20 surface used for approvals, and the two historically deployed
//! shapes (V0 and V1) of the primary sales contracts for both token
//! standards.

use alloy::sol;

sol! {
    /// The minimal ERC-20 surface used by the buy flow.
    #[derive(Debug)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
    }

    /// The current (V1) ERC-1155 sales contract.
    #[derive(Debug)]
    interface IERC1155SaleV1 {
        function tokenSaleDetails(uint256 tokenId)
            external
            view
            returns (uint256 cost, uint256 supplyCap, uint64 startTime, uint64 endTime, bytes32 merkleRoot);

        function mint(
            address to,
            uint256[] calldata tokenIds,
            uint256[] calldata amounts,
            bytes calldata data,
            address expectedPaymentToken,
            uint256 maxTotal,
            bytes32[] calldata proof
        ) external payable;
    }

    /// The legacy (V0) ERC-1155 sales contract. Note the different
    /// sale-details entry point and mint argument order.
    #[derive(Debug)]
    interface IERC1155SaleV0 {
        function globalSaleDetails()
            external
            view
            returns (uint256 cost, uint256 supplyCap, uint64 startTime, uint64 endTime);

        function mint(
            address to,
            uint256[] calldata tokenIds,
            uint256[] calldata amounts,
            address expectedPaymentToken,
            uint256 maxTotal,
            bytes calldata data
        ) external payable;
    }

    /// The current (V1) ERC-721 sales contract.
    #[derive(Debug)]
    interface IERC721SaleV1 {
        function saleDetails()
            external
            view
            returns (
                uint256 supplyCap,
                uint256 cost,
                address paymentToken,
                uint64 startTime,
                uint64 endTime,
                bytes32 merkleRoot
            );

        function mint(
            address to,
            uint256 amount,
            address expectedPaymentToken,
            uint256 maxTotal,
            bytes32[] calldata proof
        ) external payable;
    }

    /// The legacy (V0) ERC-721 sales contract. The sale-details function
    /// shares its name with V1 but returns a different shape, so version
    /// probes must check that the returned data decodes, not just that the
    /// call succeeded.
    #[derive(Debug)]
    interface IERC721SaleV0 {
        function saleDetails()
            external
            view
            returns (uint256 supplyCap, uint256 cost, uint64 startTime, uint64 endTime);

        function mint(
            address to,
            uint256 amount,
            address expectedPaymentToken,
            uint256 maxTotal,
            bytes32[] calldata proof
        ) external payable;
    }
}
